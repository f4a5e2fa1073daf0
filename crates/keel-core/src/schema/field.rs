use crate::{
    value::{FieldValue, PersistedEnum},
    Result, Value,
};

use std::{fmt, sync::Arc};

type Getter<M> = Arc<dyn Fn(&M) -> Result<Value> + Send + Sync>;
type Setter<M> = Arc<dyn Fn(&mut M, Value) -> Result<()> + Send + Sync>;

/// Semantic type of a model object field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Short,
    Int,
    Long,
    Bool,
    Enum(EnumTags),
}

impl FieldType {
    pub fn is_string(&self) -> bool {
        matches!(self, FieldType::String)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Short | FieldType::Int | FieldType::Long)
    }

    /// Name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Short => "short",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Bool => "bool",
            FieldType::Enum(tags) => tags.type_name,
        }
    }
}

/// The tag table of an enum field, captured from its [`PersistedEnum`]
/// implementation when the field is declared.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumTags {
    type_name: &'static str,
    variants: Vec<(String, i32)>,
}

impl EnumTags {
    pub fn of<E: PersistedEnum>() -> Self {
        EnumTags {
            type_name: std::any::type_name::<E>(),
            variants: E::TAGS
                .iter()
                .map(|(variant, tag)| (format!("{variant:?}"), *tag))
                .collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Variant names and their tags, in declaration order of the tag table.
    pub fn variants(&self) -> &[(String, i32)] {
        &self.variants
    }

    pub fn contains(&self, tag: i32) -> bool {
        self.variants.iter().any(|(_, t)| *t == tag)
    }
}

/// Index role of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexRole {
    #[default]
    None,
    NonUnique,
    Unique,
    /// The table's primary, database-generated key.
    Identity,
}

/// Describes one field of a model object: its column name, semantic type,
/// size, nullability, default, index role, and how to read and write the
/// value on an instance.
///
/// Values are only ever read and written through [`Field::get`] and
/// [`Field::set`], which lets the marshaller handle any model type without
/// knowing its layout.
pub struct Field<M> {
    name: String,
    ty: FieldType,
    size: u32,
    nullable: bool,
    default_value: Option<String>,
    index: IndexRole,
    get: Getter<M>,
    set: Setter<M>,
}

impl<M: 'static> Field<M> {
    /// A string field holding at most `size` characters.
    pub fn string<T>(
        name: &str,
        size: u32,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: FieldValue<Repr = String> + 'static,
    {
        Self::typed(name, FieldType::String, size, get, set)
    }

    /// A 16-bit integer field.
    pub fn short<T>(
        name: &str,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: FieldValue<Repr = i16> + 'static,
    {
        Self::typed(name, FieldType::Short, 0, get, set)
    }

    /// A 32-bit integer field.
    pub fn int<T>(
        name: &str,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: FieldValue<Repr = i32> + 'static,
    {
        Self::typed(name, FieldType::Int, 0, get, set)
    }

    /// A 64-bit integer field.
    pub fn long<T>(
        name: &str,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: FieldValue<Repr = i64> + 'static,
    {
        Self::typed(name, FieldType::Long, 0, get, set)
    }

    pub fn bool<T>(
        name: &str,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: FieldValue<Repr = bool> + 'static,
    {
        Self::typed(name, FieldType::Bool, 0, get, set)
    }

    /// An enum field, stored as the variant's tag.
    pub fn enumeration<E: PersistedEnum>(
        name: &str,
        get: impl Fn(&M) -> E + Send + Sync + 'static,
        set: impl Fn(&mut M, E) + Send + Sync + 'static,
    ) -> Self {
        Field {
            name: name.to_string(),
            ty: FieldType::Enum(EnumTags::of::<E>()),
            size: 0,
            nullable: false,
            default_value: None,
            index: IndexRole::None,
            get: Arc::new(move |instance| get(instance).to_tag().map(Value::Enum)),
            set: Arc::new(move |instance, value| {
                let variant = match value {
                    Value::Enum(tag) | Value::I32(tag) => E::from_tag(tag)?,
                    value => return Err(crate::Error::type_conversion(value, "enum tag")),
                };
                set(instance, variant);
                Ok(())
            }),
        }
    }

    fn typed<T: FieldValue + 'static>(
        name: &str,
        ty: FieldType,
        size: u32,
        get: impl Fn(&M) -> T + Send + Sync + 'static,
        set: impl Fn(&mut M, T) + Send + Sync + 'static,
    ) -> Self {
        Field {
            name: name.to_string(),
            ty,
            size,
            nullable: T::NULLABLE,
            default_value: None,
            index: IndexRole::None,
            get: Arc::new(move |instance| Ok(get(instance).into_value())),
            set: Arc::new(move |instance, value| {
                set(instance, T::from_value(value)?);
                Ok(())
            }),
        }
    }
}

impl<M> Field<M> {
    /// Marks this field as the table's database-generated primary key.
    pub fn identity(mut self) -> Self {
        self.index = IndexRole::Identity;
        self
    }

    pub fn index(mut self, role: IndexRole) -> Self {
        self.index = role;
        self
    }

    pub fn unique(self) -> Self {
        self.index(IndexRole::Unique)
    }

    pub fn non_unique(self) -> Self {
        self.index(IndexRole::NonUnique)
    }

    /// Allows SQL `NULL` in the column even when the Rust type cannot hold
    /// it.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Column default, as a SQL literal (e.g. `'0'` or `0`).
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default_value = Some(literal.into());
        self
    }

    /// Returns a copy of this field with a different declared size.
    pub(crate) fn resized(&self, size: u32) -> Self {
        Field {
            size,
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    /// Declared size. Only meaningful for string fields.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_literal(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The role declared on the field itself. A schema version may override
    /// it, see [`Schema::index_role`](super::Schema::index_role).
    pub fn index_role(&self) -> IndexRole {
        self.index
    }

    pub fn is_unique_id(&self) -> bool {
        self.index == IndexRole::Identity
    }

    /// Reads this field's semantic value from `instance`.
    pub fn get(&self, instance: &M) -> Result<Value> {
        (self.get)(instance)
    }

    /// Writes a semantic value into `instance`.
    pub fn set(&self, instance: &mut M, value: Value) -> Result<()> {
        (self.set)(instance, value)
    }
}

impl<M> Clone for Field<M> {
    fn clone(&self) -> Self {
        Field {
            name: self.name.clone(),
            ty: self.ty.clone(),
            size: self.size,
            nullable: self.nullable,
            default_value: self.default_value.clone(),
            index: self.index,
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("size", &self.size)
            .field("nullable", &self.nullable)
            .field("default_value", &self.default_value)
            .field("index", &self.index)
            .finish()
    }
}
