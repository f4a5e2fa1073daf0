use super::{Formatter, Ident, ToSql};
use crate::Type;

use keel_core::{driver::Flavor, schema::Field};

/// A column definition: name, storage type, and modifiers.
pub(super) struct ColumnDef<'a, M> {
    pub(super) field: &'a Field<M>,

    /// Give a `NOT NULL` column without a declared default an implicit zero
    /// default. SQLite requires one to add such a column to a table.
    pub(super) zero_default: bool,
}

impl<M> ToSql for ColumnDef<'_, M> {
    fn to_sql(self, f: &mut Formatter<'_>) {
        let field = self.field;
        let ty = Type::for_field(field);

        fmt!(f, Ident(field.name()) " ");

        if field.is_unique_id() && f.serializer.flavor == Flavor::Sqlite {
            fmt!(f, "INTEGER PRIMARY KEY AUTOINCREMENT");
            return;
        }

        fmt!(f, ty);

        if !field.is_nullable() {
            fmt!(f, " NOT NULL");
        } else if f.serializer.flavor == Flavor::Mysql {
            fmt!(f, " NULL");
        }

        match field.default_literal() {
            Some(literal) => fmt!(f, " DEFAULT " literal),
            None if self.zero_default && !field.is_nullable() => {
                let zero = if ty.is_integer() { "0" } else { "''" };
                fmt!(f, " DEFAULT " zero)
            }
            None => {}
        }

        if field.is_unique_id() {
            fmt!(f, " AUTO_INCREMENT");
        }
    }
}
