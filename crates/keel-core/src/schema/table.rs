use super::{Delta, Field, IndexRole, MultiFieldIndex};
use crate::{Error, Result};

use std::{fmt, sync::Arc};

/// Metadata describing one model object type's table and its version
/// history.
///
/// A schema is a linked list of versions: each derived version points at
/// the version it was based on and records the deltas that lead from there
/// to itself. The head of the list is the current version.
///
/// Field order is significant. It fixes the column order of the table and
/// the placeholder order of every generated statement, so it must never be
/// permuted once a version has shipped.
pub struct Schema<M> {
    pub(super) name: String,
    pub(super) table_name: String,
    pub(super) version: u32,
    pub(super) fields: Vec<Arc<Field<M>>>,
    pub(super) index_overrides: Vec<(String, IndexRole)>,
    pub(super) indices: Vec<MultiFieldIndex>,
    pub(super) deltas: Vec<Delta<M>>,
    pub(super) previous: Option<Arc<Schema<M>>>,
}

impl<M> Schema<M> {
    /// Schema name, e.g. `course`. Also the prefix of multi-field index names.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Field<M>> + '_ {
        self.fields.iter().map(|field| &**field)
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, name: &str) -> Option<&Field<M>> {
        self.fields().find(|field| field.name() == name)
    }

    pub fn indices(&self) -> &[MultiFieldIndex] {
        &self.indices
    }

    /// Deltas leading from the previous version to this one.
    pub fn deltas(&self) -> &[Delta<M>] {
        &self.deltas
    }

    pub fn previous(&self) -> Option<&Schema<M>> {
        self.previous.as_deref()
    }

    /// The effective index role of `field` in this version, taking
    /// overrides into account.
    pub fn index_role(&self, field: &Field<M>) -> IndexRole {
        self.index_overrides
            .iter()
            .rev()
            .find(|(name, _)| name == field.name())
            .map(|(_, role)| *role)
            .unwrap_or_else(|| field.index_role())
    }

    pub fn has_unique_id(&self) -> bool {
        self.fields().any(|field| field.is_unique_id())
    }

    /// Returns the identity field.
    ///
    /// Asking a schema without one is a programming error and is reported
    /// as [`Error::is_invalid_schema`].
    pub fn unique_id_field(&self) -> Result<&Field<M>> {
        self.fields()
            .find(|field| field.is_unique_id())
            .ok_or_else(|| {
                Error::invalid_schema(format!("schema `{}` has no unique id field", self.name))
            })
    }

    /// Returns this schema as it was at `version`.
    pub fn schema_with_version(&self, version: u32) -> Result<&Schema<M>> {
        let mut schema = self;
        loop {
            if schema.version == version {
                return Ok(schema);
            }
            match schema.previous() {
                Some(previous) if schema.version > version => schema = previous,
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "no version {version} of schema `{}` (current version is {})",
                        self.name, self.version
                    )))
                }
            }
        }
    }

    /// Every version of this schema, oldest first.
    pub fn history(&self) -> Vec<&Schema<M>> {
        let mut versions = vec![self];
        let mut schema = self;
        while let Some(previous) = schema.previous() {
            versions.push(previous);
            schema = previous;
        }
        versions.reverse();
        versions
    }

    /// Seed-row deltas from every version, in version order.
    pub fn seed_rows(&self) -> impl Iterator<Item = &Arc<M>> + '_ {
        self.history()
            .into_iter()
            .flat_map(|schema| schema.deltas.iter())
            .filter_map(|delta| match delta {
                Delta::PersistSeedRow(row) => Some(row),
                _ => None,
            })
    }
}

impl<M> fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("table_name", &self.table_name)
            .field("version", &self.version)
            .field("fields", &self.fields)
            .field("index_overrides", &self.index_overrides)
            .field("indices", &self.indices)
            .field("deltas", &self.deltas)
            .finish()
    }
}
