use crate::{Error, Result};

use std::fmt;

/// A single field or column value.
///
/// The same type is used on both sides of the driver boundary. Instances
/// produce semantic values through their field accessors (`Enum` carries the
/// stored tag, never a declaration index). Drivers return raw values (`Null`,
/// `I64`, `String`) that the marshaller converts back to the field's
/// semantic type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    String(String),
    /// A persisted enum variant, by its stored integer tag.
    Enum(i32),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short lowercase name of the value's variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "short",
            Value::I32(_) => "int",
            Value::I64(_) => "long",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
        }
    }

    /// Returns the value as a 64-bit integer if it holds any integer-like
    /// variant. Booleans count as 0/1 and enums as their tag.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Bool(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            Value::Enum(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::Enum(v) => write!(f, "#{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

/// Rust types that can be stored in a model object field.
///
/// `Repr` names the semantic storage type, so that a field declared as an
/// `int` can only be backed by `i32` or `Option<i32>`.
pub trait FieldValue: Sized {
    type Repr;

    /// `true` when the type can represent SQL `NULL`.
    const NULLABLE: bool = false;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

impl FieldValue for String {
    type Repr = String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(v) => Ok(v),
            value => Err(Error::type_conversion(value, "String")),
        }
    }
}

impl FieldValue for bool {
    type Repr = bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            value => Err(Error::type_conversion(value, "bool")),
        }
    }
}

macro_rules! impl_field_value_for_int {
    ( $( $t:ty => $variant:ident ),+ ) => {
        $(
            impl FieldValue for $t {
                type Repr = $t;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    let wide = match value {
                        Value::I16(v) => v as i64,
                        Value::I32(v) => v as i64,
                        Value::I64(v) => v,
                        value => return Err(Error::type_conversion(value, stringify!($t))),
                    };
                    <$t>::try_from(wide)
                        .map_err(|_| Error::type_conversion(Value::I64(wide), stringify!($t)))
                }
            }
        )+
    };
}

impl_field_value_for_int!(i16 => I16, i32 => I32, i64 => I64);

impl<T: FieldValue> FieldValue for Option<T> {
    type Repr = T::Repr;

    const NULLABLE: bool = true;

    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}

/// An enum stored as an explicit integer tag.
///
/// The tag table is the on-disk contract: reordering variants in the Rust
/// declaration does not change what is stored, but changing a tag does.
///
/// ```
/// use keel_core::value::PersistedEnum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Role {
///     Student,
///     Instructor,
/// }
///
/// impl PersistedEnum for Role {
///     const TAGS: &'static [(Self, i32)] = &[(Role::Student, 0), (Role::Instructor, 1)];
/// }
///
/// assert_eq!(Role::Instructor.to_tag().unwrap(), 1);
/// assert_eq!(Role::from_tag(0).unwrap(), Role::Student);
/// ```
pub trait PersistedEnum: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Every variant alongside its stored tag.
    const TAGS: &'static [(Self, i32)];

    fn to_tag(self) -> Result<i32> {
        Self::TAGS
            .iter()
            .find(|(variant, _)| *variant == self)
            .map(|(_, tag)| *tag)
            .ok_or_else(|| {
                Error::invalid_schema(format!(
                    "enum variant {self:?} of {} has no stored tag",
                    std::any::type_name::<Self>()
                ))
            })
    }

    fn from_tag(tag: i32) -> Result<Self> {
        Self::TAGS
            .iter()
            .find(|(_, t)| *t == tag)
            .map(|(variant, _)| *variant)
            .ok_or_else(|| Error::type_conversion(Value::Enum(tag), std::any::type_name::<Self>()))
    }
}
