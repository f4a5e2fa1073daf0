use super::{column_def::ColumnDef, Comma, Ident, Serializer, ToSql};

use keel_core::schema::{IndexRole, Schema};

impl Serializer {
    /// `CREATE TABLE` for the schema's current shape.
    ///
    /// On MySQL the key clauses are part of the statement. SQLite cannot
    /// declare secondary keys inline, so they are returned separately by
    /// [`Serializer::create_table_indices`].
    pub fn create_table<M>(&self, schema: &Schema<M>) -> String {
        self.serialize(|f| {
            fmt!(f, "CREATE TABLE " Ident(schema.table_name()) " (");

            let mut s = "\n  ";
            for field in schema.fields() {
                let column = ColumnDef {
                    field,
                    zero_default: false,
                };
                fmt!(f, s column);
                s = ",\n  ";
            }

            if !self.is_mysql() {
                fmt!(f, "\n)");
                return;
            }

            if let Ok(id) = schema.unique_id_field() {
                fmt!(f, s "PRIMARY KEY (" Ident(id.name()) ")");
            }

            for field in schema.fields() {
                let key = match schema.index_role(field) {
                    IndexRole::Unique => "UNIQUE KEY ",
                    IndexRole::NonUnique => "KEY ",
                    IndexRole::None | IndexRole::Identity => continue,
                };
                fmt!(f, s key Ident(field.name()) " (" Ident(field.name()) ")");
            }

            for index in schema.indices() {
                let key = if index.is_unique() {
                    "UNIQUE INDEX "
                } else {
                    "INDEX "
                };
                let columns = Comma(index.fields().iter().map(Ident));
                fmt!(f, s key Ident(index.name(schema.name())) " (" columns ")");
            }

            let (engine, charset) = (self.storage_engine.as_str(), self.charset.as_str());
            fmt!(f, "\n) ENGINE=" engine " DEFAULT CHARSET=" charset);
        })
    }

    /// Separate index statements that accompany [`Serializer::create_table`].
    /// Always empty on MySQL.
    pub fn create_table_indices<M>(&self, schema: &Schema<M>) -> Vec<String> {
        if self.is_mysql() {
            return vec![];
        }

        let table = schema.table_name();
        let mut ret = vec![];

        for field in schema.fields() {
            let unique = match schema.index_role(field) {
                IndexRole::Unique => true,
                IndexRole::NonUnique => false,
                IndexRole::None | IndexRole::Identity => continue,
            };
            let name = format!("{table}_{}", field.name());
            ret.push(self.create_index_on(table, &name, unique, [field.name()]));
        }

        for index in schema.indices() {
            let name = format!("{table}_{}", index.name(schema.name()));
            ret.push(self.create_index_on(table, &name, index.is_unique(), index.fields()));
        }

        ret
    }

    /// Every statement needed to create the table from scratch, in order.
    pub fn create_table_statements<M>(&self, schema: &Schema<M>) -> Vec<String> {
        let mut ret = vec![self.create_table(schema)];
        ret.extend(self.create_table_indices(schema));
        ret
    }

    /// `CREATE [UNIQUE] INDEX name ON table (columns)`.
    pub(super) fn create_index_on<I>(&self, table: &str, name: &str, unique: bool, columns: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.serialize(|f| {
            let kind = if unique {
                "CREATE UNIQUE INDEX "
            } else {
                "CREATE INDEX "
            };
            let columns = Comma(columns.into_iter().map(Ident));
            fmt!(f, kind Ident(name) " ON " Ident(table) " (" columns ")");
        })
    }
}
