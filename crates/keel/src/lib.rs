mod config;
pub use config::Config;

mod engine;
pub use engine::Engine;

pub mod marshal;

pub mod migrate;
pub use migrate::{Migrate, MigrationReport, Outcome, TableReport, VersionMismatch};

mod persist;

pub mod transaction;
pub use transaction::Scope;

pub use keel_core::{
    bail, driver, err,
    schema::{self, Delta, Field, IndexRole, MultiFieldIndex, Schema, Table},
    value::{self, FieldValue, PersistedEnum},
    Connection, Error, Result, Value,
};
pub use keel_sql::Serializer;
