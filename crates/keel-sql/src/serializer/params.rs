use super::{Formatter, ToSql};

/// A bound parameter.
pub(super) struct Placeholder;

impl ToSql for Placeholder {
    fn to_sql(self, f: &mut Formatter<'_>) {
        f.dst.push('?');
    }
}

/// One position of an insert's value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A `?` placeholder bound from the instance.
    Param,

    /// A literal `NULL` letting the database assign the identity.
    GeneratedId,
}

impl ToSql for Slot {
    fn to_sql(self, f: &mut Formatter<'_>) {
        match self {
            Slot::Param => fmt!(f, Placeholder),
            Slot::GeneratedId => fmt!(f, "NULL"),
        }
    }
}
