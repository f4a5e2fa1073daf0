use super::{Ident, Placeholder, Serializer, ToSql};

const TABLE_NAME: &str = "table_name";
const SCHEMA_VERSION: &str = "schema_version";

/// Statements over the schema version registry, a table mapping each
/// managed table name to its applied schema version.
impl Serializer {
    /// Counts tables named by the single parameter.
    pub fn table_exists(&self) -> String {
        if self.is_mysql() {
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?"
                .to_string()
        } else {
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?".to_string()
        }
    }

    pub fn create_registry(&self, registry: &str) -> String {
        self.serialize(|f| {
            fmt!(
                f, "CREATE TABLE " Ident(registry) " ("
                Ident(TABLE_NAME) " varchar(50) PRIMARY KEY, "
                Ident(SCHEMA_VERSION) " mediumint)"
            );
        })
    }

    /// Selects the stored version of the table named by the parameter.
    pub fn select_registry_version(&self, registry: &str) -> String {
        self.serialize(|f| {
            fmt!(
                f, "SELECT " Ident(SCHEMA_VERSION) " FROM " Ident(registry)
                " WHERE " Ident(TABLE_NAME) " = " Placeholder
            );
        })
    }

    /// Selects every `(table_name, schema_version)` row.
    pub fn select_registry(&self, registry: &str) -> String {
        self.serialize(|f| {
            fmt!(
                f, "SELECT " Ident(TABLE_NAME) ", " Ident(SCHEMA_VERSION)
                " FROM " Ident(registry) " ORDER BY " Ident(TABLE_NAME)
            );
        })
    }

    /// Inserts `(table_name, schema_version)`.
    pub fn insert_registry_row(&self, registry: &str) -> String {
        self.serialize(|f| {
            fmt!(
                f, "INSERT INTO " Ident(registry) " (" Ident(TABLE_NAME) ", "
                Ident(SCHEMA_VERSION) ") VALUES (" Placeholder ", " Placeholder ")"
            );
        })
    }

    /// Sets `schema_version` (first parameter) of `table_name` (second).
    pub fn update_registry_row(&self, registry: &str) -> String {
        self.serialize(|f| {
            fmt!(
                f, "UPDATE " Ident(registry) " SET " Ident(SCHEMA_VERSION) " = " Placeholder
                " WHERE " Ident(TABLE_NAME) " = " Placeholder
            );
        })
    }
}
