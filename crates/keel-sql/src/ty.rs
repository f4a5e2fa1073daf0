use keel_core::schema::{Field, FieldType};

use std::fmt;

/// Largest string size stored as `varchar(n)`.
pub const VARCHAR_MAX: u32 = 16384;

/// Largest string size stored as `text`. Anything larger is `mediumtext`.
pub const TEXT_MAX: u32 = 32768;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Varchar(u32),
    Text,
    MediumText,
    MediumInt,
    Int,
    BigInt,
    TinyInt,
}

impl Type {
    /// Maps a field's semantic type to its storage type.
    ///
    /// Size thresholds are inclusive on the smaller type: a string of size
    /// exactly [`VARCHAR_MAX`] is still a `varchar`.
    pub fn for_field<M>(field: &Field<M>) -> Type {
        match field.ty() {
            FieldType::String => match field.size() {
                size if size <= VARCHAR_MAX => Type::Varchar(size),
                size if size <= TEXT_MAX => Type::Text,
                _ => Type::MediumText,
            },
            FieldType::Short => Type::MediumInt,
            FieldType::Int => Type::Int,
            FieldType::Long => Type::BigInt,
            FieldType::Bool => Type::TinyInt,
            // Enums are stored as their integer tag.
            FieldType::Enum(_) => Type::Int,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Type::MediumInt | Type::Int | Type::BigInt | Type::TinyInt
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Varchar(size) => write!(f, "varchar({size})"),
            Type::Text => f.write_str("text"),
            Type::MediumText => f.write_str("mediumtext"),
            Type::MediumInt => f.write_str("mediumint(9)"),
            Type::Int => f.write_str("int(11)"),
            Type::BigInt => f.write_str("bigint(20)"),
            Type::TinyInt => f.write_str("tinyint(1)"),
        }
    }
}
