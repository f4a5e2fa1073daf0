use super::{column_def::ColumnDef, Comma, Ident, Serializer, ToSql};

use keel_core::schema::{Field, IndexRole, MultiFieldIndex, Schema};

impl Serializer {
    /// Adds `field` to the table, positioned after the column `after` where
    /// the dialect supports it.
    pub fn add_column_after<M>(&self, schema: &Schema<M>, field: &Field<M>, after: &str) -> String {
        self.serialize(|f| {
            let column = ColumnDef {
                field,
                zero_default: !self.is_mysql(),
            };
            fmt!(f, "ALTER TABLE " Ident(schema.table_name()) " ADD COLUMN " column);

            if self.is_mysql() {
                fmt!(f, " AFTER " Ident(after));
            }
        })
    }

    /// The index accompanying a column added in `version`, or `None` when
    /// the field has no index role in `schema`.
    pub fn add_field_index<M>(
        &self,
        schema: &Schema<M>,
        field: &Field<M>,
        version: u32,
    ) -> Option<String> {
        let unique = match schema.index_role(field) {
            IndexRole::Unique => true,
            IndexRole::NonUnique => false,
            IndexRole::None | IndexRole::Identity => return None,
        };
        let name = format!("addcol_{version}_{}", field.name());

        if self.is_mysql() {
            Some(self.alter_table_add_index(schema.table_name(), &name, unique, [field.name()]))
        } else {
            let name = format!("{}_{name}", schema.table_name());
            Some(self.create_index_on(schema.table_name(), &name, unique, [field.name()]))
        }
    }

    /// Widens the column of `field` to its declared size.
    ///
    /// Returns `None` on SQLite, which does not enforce column sizes.
    pub fn modify_column<M>(&self, schema: &Schema<M>, field: &Field<M>) -> Option<String> {
        if !self.is_mysql() {
            return None;
        }

        Some(self.serialize(|f| {
            let column = ColumnDef {
                field,
                zero_default: false,
            };
            fmt!(f, "ALTER TABLE " Ident(schema.table_name()) " MODIFY " column);
        }))
    }

    /// Creates a multi-field index on an existing table.
    pub fn create_index<M>(&self, schema: &Schema<M>, index: &MultiFieldIndex) -> String {
        let table = schema.table_name();
        let name = index.name(schema.name());

        if self.is_mysql() {
            self.alter_table_add_index(table, &name, index.is_unique(), index.fields())
        } else {
            let name = format!("{table}_{name}");
            self.create_index_on(table, &name, index.is_unique(), index.fields())
        }
    }

    fn alter_table_add_index<I>(&self, table: &str, name: &str, unique: bool, columns: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.serialize(|f| {
            let kind = if unique { " ADD UNIQUE INDEX " } else { " ADD INDEX " };
            let columns = Comma(columns.into_iter().map(Ident));
            fmt!(f, "ALTER TABLE " Ident(table) kind Ident(name) " (" columns ")");
        })
    }
}
