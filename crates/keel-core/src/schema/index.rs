use super::IndexRole;

/// A named composite index over several fields.
///
/// The index number is unique within a schema and is the only input to the
/// index name, so renaming fields never renames the index.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiFieldIndex {
    number: u32,
    role: IndexRole,
    fields: Vec<String>,
}

impl MultiFieldIndex {
    pub fn unique(number: u32, fields: &[&str]) -> Self {
        Self::new(number, IndexRole::Unique, fields)
    }

    pub fn non_unique(number: u32, fields: &[&str]) -> Self {
        Self::new(number, IndexRole::NonUnique, fields)
    }

    fn new(number: u32, role: IndexRole, fields: &[&str]) -> Self {
        MultiFieldIndex {
            number,
            role,
            fields: fields.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Either [`IndexRole::Unique`] or [`IndexRole::NonUnique`].
    pub fn role(&self) -> IndexRole {
        self.role
    }

    pub fn is_unique(&self) -> bool {
        self.role == IndexRole::Unique
    }

    /// Names of the indexed fields, in index order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Stable index name derived from the schema name and index number.
    pub fn name(&self, schema_name: &str) -> String {
        format!("{schema_name}_idx_{}", self.number)
    }
}
