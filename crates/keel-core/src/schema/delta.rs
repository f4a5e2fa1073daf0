use super::Field;

use std::{fmt, sync::Arc};

/// A single declared change, introduced by the schema version it belongs to.
pub enum Delta<M> {
    /// Add `field` to the table, positioned directly after the column named
    /// `after`.
    AddFieldAfter { field: Arc<Field<M>>, after: String },

    /// Widen an existing column. `field` is the field as it is declared from
    /// this version on, i.e. already carrying `new_size`.
    IncreaseFieldSize { field: Arc<Field<M>>, new_size: u32 },

    /// Insert a pre-built row, keeping its unique id as given.
    PersistSeedRow(Arc<M>),
}

impl<M> Delta<M> {
    pub fn is_seed_row(&self) -> bool {
        matches!(self, Delta::PersistSeedRow(_))
    }

    /// Short description used in log output.
    pub fn describe(&self) -> String {
        match self {
            Delta::AddFieldAfter { field, after } => {
                format!("add field `{}` after `{after}`", field.name())
            }
            Delta::IncreaseFieldSize { field, new_size } => {
                format!("increase size of `{}` to {new_size}", field.name())
            }
            Delta::PersistSeedRow(_) => "persist seed row".to_string(),
        }
    }
}

impl<M> Clone for Delta<M> {
    fn clone(&self) -> Self {
        match self {
            Delta::AddFieldAfter { field, after } => Delta::AddFieldAfter {
                field: field.clone(),
                after: after.clone(),
            },
            Delta::IncreaseFieldSize { field, new_size } => Delta::IncreaseFieldSize {
                field: field.clone(),
                new_size: *new_size,
            },
            Delta::PersistSeedRow(row) => Delta::PersistSeedRow(row.clone()),
        }
    }
}

impl<M> fmt::Debug for Delta<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
