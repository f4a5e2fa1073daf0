use super::{Comma, Ident, Placeholder, Serializer, Slot, ToSql};

use keel_core::{schema::Schema, Result};

impl Serializer {
    /// The value slots of an insert, one per field in declared order.
    ///
    /// Without `include_id` the identity position is a literal `NULL` so
    /// the database assigns the key.
    pub fn insert_slots<M>(&self, schema: &Schema<M>, include_id: bool) -> Vec<Slot> {
        schema
            .fields()
            .map(|field| {
                if field.is_unique_id() && !include_id {
                    Slot::GeneratedId
                } else {
                    Slot::Param
                }
            })
            .collect()
    }

    /// Comma separated insert placeholders, e.g. `NULL, ?, ?`.
    pub fn insert_placeholders<M>(&self, schema: &Schema<M>, include_id: bool) -> String {
        let slots = self.insert_slots(schema, include_id);
        self.serialize(|f| fmt!(f, Comma(slots)))
    }

    /// Comma separated update assignments, e.g. `title = ?, term = ?`.
    pub fn update_placeholders<M>(&self, schema: &Schema<M>, include_id: bool) -> String {
        self.serialize(|f| {
            let assignments = schema
                .fields()
                .filter(|field| include_id || !field.is_unique_id())
                .map(|field| Assign(field.name()));
            fmt!(f, Comma(assignments));
        })
    }

    /// Insert with a database-generated identity.
    pub fn insert<M>(&self, schema: &Schema<M>) -> String {
        self.insert_with(schema, false)
    }

    /// Insert taking the identity value from the instance.
    pub fn insert_exact<M>(&self, schema: &Schema<M>) -> String {
        self.insert_with(schema, true)
    }

    fn insert_with<M>(&self, schema: &Schema<M>, include_id: bool) -> String {
        let slots = self.insert_slots(schema, include_id);

        self.serialize(|f| {
            fmt!(f, "INSERT INTO " Ident(schema.table_name()));

            // SQLite cannot position added columns, so its physical column
            // order may differ from the declared order.
            if !self.is_mysql() {
                let columns = Comma(schema.fields().map(|field| Ident(field.name())));
                fmt!(f, " (" columns ")");
            }

            fmt!(f, " VALUES (" Comma(slots) ")");
        })
    }

    /// Update of every non-identity field, targeting the row by identity.
    pub fn update<M>(&self, schema: &Schema<M>) -> Result<String> {
        let id = schema.unique_id_field()?;
        let assignments = self.update_placeholders(schema, false);

        Ok(self.serialize(|f| {
            fmt!(f, "UPDATE " Ident(schema.table_name()) " SET " assignments);
            fmt!(f, " WHERE " Ident(id.name()) " = " Placeholder);
        }))
    }

    /// Select of one row by identity.
    pub fn select_by_id<M>(&self, schema: &Schema<M>) -> Result<String> {
        let id = schema.unique_id_field()?;
        let select = self.select_all(schema);

        Ok(self.serialize(|f| {
            fmt!(f, select " WHERE " Ident(id.name()) " = " Placeholder);
        }))
    }

    /// Select of every row, columns in declared field order.
    pub fn select_all<M>(&self, schema: &Schema<M>) -> String {
        self.serialize(|f| {
            let columns = Comma(schema.fields().map(|field| Ident(field.name())));
            fmt!(f, "SELECT " columns " FROM " Ident(schema.table_name()));
        })
    }
}

/// `name = ?`
struct Assign<'a>(&'a str);

impl ToSql for Assign<'_> {
    fn to_sql(self, f: &mut super::Formatter<'_>) {
        fmt!(f, Ident(self.0) " = " Placeholder);
    }
}
