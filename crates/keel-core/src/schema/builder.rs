use super::{verify, Delta, Field, IndexRole, MultiFieldIndex, Schema};
use crate::{Error, Result};

use heck::ToSnakeCase;
use std::sync::Arc;

/// Builds a [`Schema`], either the base version (see [`Schema::builder`]) or
/// a version derived from an earlier one (see [`Schema::based_on`]).
///
/// Mistakes such as adding a base field to a derived version are recorded
/// and reported by [`SchemaBuilder::build`].
pub struct SchemaBuilder<M> {
    name: String,
    table_prefix: String,
    table_name: Option<String>,
    fields: Vec<Arc<Field<M>>>,
    index_overrides: Vec<(String, IndexRole)>,
    indices: Vec<MultiFieldIndex>,
    pending: Vec<PendingDelta<M>>,
    previous: Option<Arc<Schema<M>>>,
    misuse: Option<String>,
}

enum PendingDelta<M> {
    Add { field: Arc<Field<M>>, after: String },
    Widen { name: String, new_size: u32 },
    Seed(Arc<M>),
}

impl<M> Schema<M> {
    /// Starts the base version (version 0) of a schema named `name`.
    ///
    /// Unless set explicitly, the table name is the pluralized snake case
    /// form of the schema name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder<M> {
        SchemaBuilder {
            name: name.into(),
            table_prefix: String::new(),
            table_name: None,
            fields: vec![],
            index_overrides: vec![],
            indices: vec![],
            pending: vec![],
            previous: None,
            misuse: None,
        }
    }

    /// Starts the version following `previous`. The new version inherits
    /// the table name, fields, overrides, and indices of `previous`.
    pub fn based_on(previous: impl Into<Arc<Schema<M>>>) -> SchemaBuilder<M> {
        let previous = previous.into();
        SchemaBuilder {
            name: previous.name.clone(),
            table_prefix: String::new(),
            table_name: None,
            fields: previous.fields.clone(),
            index_overrides: previous.index_overrides.clone(),
            indices: previous.indices.clone(),
            pending: vec![],
            previous: Some(previous),
            misuse: None,
        }
    }
}

impl<M> SchemaBuilder<M> {
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        if self.previous.is_some() {
            self.misused("the table prefix is fixed by the base version");
        }
        self.table_prefix = prefix.into();
        self
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        if self.previous.is_some() {
            self.misused("the table name is fixed by the base version");
        }
        self.table_name = Some(name.into());
        self
    }

    /// Appends a field to the base version.
    pub fn field(mut self, field: Field<M>) -> Self {
        if self.previous.is_some() {
            self.misused(&format!(
                "field `{}` must be added with `add_after` in a derived version",
                field.name()
            ));
        }
        self.fields.push(Arc::new(field));
        self
    }

    /// Adds `field` directly after the field named `after`.
    pub fn add_after(mut self, after: &str, field: Field<M>) -> Self {
        self.require_derived("add_after");
        self.pending.push(PendingDelta::Add {
            field: Arc::new(field),
            after: after.to_string(),
        });
        self
    }

    /// Widens the string field named `name` to `new_size`.
    pub fn increase_size(mut self, name: &str, new_size: u32) -> Self {
        self.require_derived("increase_size");
        self.pending.push(PendingDelta::Widen {
            name: name.to_string(),
            new_size,
        });
        self
    }

    /// Persists `row` with its unique id as given when this version is
    /// applied.
    pub fn persist(mut self, row: M) -> Self {
        self.require_derived("persist");
        self.pending.push(PendingDelta::Seed(Arc::new(row)));
        self
    }

    /// Copies every delta of `other` into this version, in order.
    pub fn add_deltas_from(mut self, other: &Schema<M>) -> Self {
        self.require_derived("add_deltas_from");
        for delta in other.deltas() {
            self.pending.push(match delta {
                Delta::AddFieldAfter { field, after } => PendingDelta::Add {
                    field: field.clone(),
                    after: after.clone(),
                },
                Delta::IncreaseFieldSize { field, new_size } => PendingDelta::Widen {
                    name: field.name().to_string(),
                    new_size: *new_size,
                },
                Delta::PersistSeedRow(row) => PendingDelta::Seed(row.clone()),
            });
        }
        self
    }

    /// Overrides the index role of the field named `name` from this version
    /// on.
    pub fn set_index_on(mut self, name: &str, role: IndexRole) -> Self {
        self.index_overrides.push((name.to_string(), role));
        self
    }

    pub fn index(mut self, index: MultiFieldIndex) -> Self {
        self.indices.push(index);
        self
    }

    pub fn build(self) -> Result<Schema<M>> {
        if let Some(message) = self.misuse {
            return Err(Error::invalid_schema(format!("schema `{}`: {message}", self.name)));
        }

        let (version, table_name) = match &self.previous {
            Some(previous) => (previous.version + 1, previous.table_name.clone()),
            None => {
                let table_name = match self.table_name {
                    Some(name) => name,
                    None => default_table_name(&self.name),
                };
                (0, format!("{}{table_name}", self.table_prefix))
            }
        };

        let mut fields = self.fields;
        let mut deltas = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            match pending {
                PendingDelta::Add { field, after } => {
                    if field.is_unique_id() {
                        return Err(Error::invalid_schema(format!(
                            "schema `{}` version {version}: the identity field `{}` cannot be added to an existing table",
                            self.name,
                            field.name()
                        )));
                    }
                    let Some(pos) = fields.iter().position(|f| f.name() == after) else {
                        return Err(Error::invalid_schema(format!(
                            "schema `{}` version {version}: cannot add field `{}` after unknown field `{after}`",
                            self.name,
                            field.name()
                        )));
                    };
                    fields.insert(pos + 1, field.clone());
                    deltas.push(Delta::AddFieldAfter { field, after });
                }
                PendingDelta::Widen { name, new_size } => {
                    let Some(pos) = fields.iter().position(|f| f.name() == name) else {
                        return Err(Error::invalid_schema(format!(
                            "schema `{}` version {version}: cannot increase size of unknown field `{name}`",
                            self.name
                        )));
                    };
                    let current = &fields[pos];
                    if !current.ty().is_string() || new_size <= current.size() {
                        return Err(Error::invalid_schema(format!(
                            "schema `{}` version {version}: field `{name}` cannot grow from {} to {new_size}",
                            self.name,
                            current.size()
                        )));
                    }
                    let field = Arc::new(current.resized(new_size));
                    fields[pos] = field.clone();
                    deltas.push(Delta::IncreaseFieldSize { field, new_size });
                }
                PendingDelta::Seed(row) => deltas.push(Delta::PersistSeedRow(row)),
            }
        }

        let schema = Schema {
            name: self.name,
            table_name,
            version,
            fields,
            index_overrides: self.index_overrides,
            indices: self.indices,
            deltas,
            previous: self.previous,
        };

        verify::verify(&schema)?;
        Ok(schema)
    }

    fn require_derived(&mut self, operation: &str) {
        if self.previous.is_none() {
            self.misused(&format!(
                "`{operation}` is only allowed in a version derived with `based_on`"
            ));
        }
    }

    fn misused(&mut self, message: &str) {
        if self.misuse.is_none() {
            self.misuse = Some(message.to_string());
        }
    }
}

fn default_table_name(schema_name: &str) -> String {
    pluralizer::pluralize(&schema_name.to_snake_case(), 2, false)
}
