//! Versioned schema migration.
//!
//! Each managed table's applied version is recorded in a registry table.
//! [`Engine::migrate`] brings every table up to its schema's current version:
//!
//! * A table with no registry row is created directly at the current version,
//!   every seed row of every version is inserted, and the registry row is
//!   written.
//! * A table behind the current version gets the deltas of each later
//!   version applied in order, then its registry row is advanced.
//! * A table at the current version is left alone.
//!
//! The work for one table happens in one transaction, so a failure leaves
//! that table's registry row where it was and the next run retries from the
//! same version. Tables are migrated one after another; a failure stops the
//! run but does not undo tables that already committed.
//!
//! When the registry itself has to be created and a managed table already
//! exists, the table is assumed to be at its current version and is only
//! recorded. Those rows are written in the transaction that creates the
//! registry, before any table is created or upgraded. Callers such as the operator CLI should ask for confirmation
//! before trusting that assumption.

use crate::{
    persist,
    transaction::{self, Scope},
    Engine,
};

use indexmap::IndexMap;
use keel_core::{
    schema::{Delta, Schema, Table},
    err, Connection, Error, Result, Value,
};
use keel_sql::Serializer;
use tracing::{debug, info, warn};

use std::fmt;

/// A table whose schema history the engine can apply.
pub trait Migrate: Table {
    /// Statements creating the table at its current version.
    fn create_statements(&self, serializer: &Serializer) -> Vec<String>;

    /// Creates the table at its current version and inserts the seed rows
    /// of every version.
    fn create(&self, scope: &mut Scope<'_>, serializer: &Serializer) -> Result<()>;

    /// Applies the deltas of every version after `from`, in order.
    fn upgrade(&self, scope: &mut Scope<'_>, serializer: &Serializer, from: u32) -> Result<()>;
}

impl<M: Send + Sync> Migrate for Schema<M> {
    fn create_statements(&self, serializer: &Serializer) -> Vec<String> {
        serializer.create_table_statements(self)
    }

    fn create(&self, scope: &mut Scope<'_>, serializer: &Serializer) -> Result<()> {
        for sql in self.create_statements(serializer) {
            scope.exec_sql(&sql)?;
        }

        for row in self.seed_rows() {
            persist::insert_exact(scope, serializer, self, row)?;
        }
        Ok(())
    }

    fn upgrade(&self, scope: &mut Scope<'_>, serializer: &Serializer, from: u32) -> Result<()> {
        for version in from + 1..=self.version() {
            let snapshot = self.schema_with_version(version)?;
            debug!(table = snapshot.table_name(), version, "applying version");

            for delta in snapshot.deltas() {
                apply_delta(scope, serializer, snapshot, delta)
                    .map_err(|err| err.context(err!("version {version}: {}", delta.describe())))?;
            }
        }
        Ok(())
    }
}

fn apply_delta<M>(
    scope: &mut Scope<'_>,
    serializer: &Serializer,
    snapshot: &Schema<M>,
    delta: &Delta<M>,
) -> Result<()> {
    match delta {
        Delta::AddFieldAfter { field, after } => {
            scope.exec_sql(&serializer.add_column_after(snapshot, field, after))?;

            if let Some(sql) = serializer.add_field_index(snapshot, field, snapshot.version()) {
                scope.exec_sql(&sql)?;
            }
        }
        Delta::IncreaseFieldSize { field, .. } => {
            if let Some(sql) = serializer.modify_column(snapshot, field) {
                scope.exec_sql(&sql)?;
            }
        }
        Delta::PersistSeedRow(row) => persist::insert_exact(scope, serializer, snapshot, row)?,
    }
    Ok(())
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The registry table did not exist and was created by this run.
    pub registry_created: bool,

    /// One entry per managed table, in the order given to the engine.
    pub tables: Vec<TableReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,

    /// The version the table is at after the run.
    pub version: u32,

    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The table was created at the current version.
    Created,

    /// Deltas were applied starting after version `from`.
    Migrated { from: u32 },

    /// The table was already at the current version.
    UpToDate,

    /// The table existed before the registry did and was recorded at the
    /// current version without changes.
    Adopted,
}

impl MigrationReport {
    pub fn outcome(&self, table: &str) -> Option<Outcome> {
        self.tables
            .iter()
            .find(|report| report.table == table)
            .map(|report| report.outcome)
    }

    /// `true` when nothing was created or changed.
    pub fn is_noop(&self) -> bool {
        !self.registry_created
            && self
                .tables
                .iter()
                .all(|report| report.outcome == Outcome::UpToDate)
    }

    /// `true` when existing tables were recorded without being checked.
    pub fn adopted_existing_tables(&self) -> bool {
        self.tables
            .iter()
            .any(|report| report.outcome == Outcome::Adopted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => f.write_str("created"),
            Outcome::Migrated { from } => write!(f, "migrated from version {from}"),
            Outcome::UpToDate => f.write_str("up to date"),
            Outcome::Adopted => f.write_str("adopted"),
        }
    }
}

/// A managed table whose stored version differs from its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMismatch {
    pub table: String,

    /// The schema's current version.
    pub expected: u32,

    /// The registry's version, `None` when the table is not registered.
    pub stored: Option<u32>,
}

impl fmt::Display for VersionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stored {
            Some(stored) => write!(
                f,
                "table {} is at version {stored}, expected {}",
                self.table, self.expected
            ),
            None => write!(f, "table {} is not registered", self.table),
        }
    }
}

impl Engine {
    /// Brings every table up to its schema's current version.
    pub fn migrate(
        &self,
        conn: &mut dyn Connection,
        tables: &[&dyn Migrate],
    ) -> Result<MigrationReport> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let registry = self.config.registry_table.as_str();

        let registry_created = !table_exists(conn, &serializer, registry)?;
        let mut adopted = vec![];
        if registry_created {
            for table in tables {
                if table_exists(conn, &serializer, table.table_name())? {
                    adopted.push(*table);
                }
            }

            info!(registry, adopted = adopted.len(), "creating schema version registry");
            let sql = serializer.create_registry(registry);
            transaction::run_in_transaction(conn, |scope| {
                scope.exec_sql(&sql)?;
                for table in &adopted {
                    warn!(
                        table = table.table_name(),
                        version = table.version(),
                        "table predates the schema version registry; recording it at the current version"
                    );
                    insert_registry_row(scope, &serializer, registry, table.table_name(), table.version())?;
                }
                Ok(())
            })?;
        }

        let mut report = MigrationReport {
            registry_created,
            tables: Vec::with_capacity(tables.len()),
        };

        for table in tables {
            let outcome = if adopted.iter().any(|t| t.table_name() == table.table_name()) {
                Outcome::Adopted
            } else {
                self.migrate_table(conn, &serializer, *table)
                    .map_err(|err| err.context(err!("migrating table {}", table.table_name())))?
            };

            info!(table = table.table_name(), version = table.version(), %outcome, "table migrated");

            report.tables.push(TableReport {
                table: table.table_name().to_string(),
                version: table.version(),
                outcome,
            });
        }

        Ok(report)
    }

    fn migrate_table(
        &self,
        conn: &mut dyn Connection,
        serializer: &Serializer,
        table: &dyn Migrate,
    ) -> Result<Outcome> {
        let registry = self.config.registry_table.as_str();
        let name = table.table_name();
        let current = table.version();

        match stored_version_of(conn, serializer, registry, name)? {
            None => {
                transaction::run_in_transaction(conn, |scope| {
                    table.create(scope, serializer)?;
                    insert_registry_row(scope, serializer, registry, name, current)
                })?;
                Ok(Outcome::Created)
            }
            Some(stored) if stored == current => Ok(Outcome::UpToDate),
            Some(stored) if stored > current => Err(Error::invalid_schema(format!(
                "stored version {stored} is newer than the current version {current}"
            ))),
            Some(stored) => {
                transaction::run_in_transaction(conn, |scope| {
                    table.upgrade(scope, serializer, stored)?;
                    update_registry_row(scope, serializer, registry, name, current)
                })?;
                Ok(Outcome::Migrated { from: stored })
            }
        }
    }

    /// Reports every table whose registry entry is missing or differs from
    /// its schema's current version. Nothing is modified.
    pub fn check_versions<T: Table + ?Sized>(
        &self,
        conn: &mut dyn Connection,
        tables: &[&T],
    ) -> Result<Vec<VersionMismatch>> {
        let versions = self.schema_versions(conn)?;

        Ok(tables
            .iter()
            .filter_map(|table| {
                let stored = versions.get(table.table_name()).copied();
                (stored != Some(table.version())).then(|| VersionMismatch {
                    table: table.table_name().to_string(),
                    expected: table.version(),
                    stored,
                })
            })
            .collect())
    }

    /// Every registry entry, by table name. Empty when the registry does not
    /// exist.
    pub fn schema_versions(&self, conn: &mut dyn Connection) -> Result<IndexMap<String, u32>> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let registry = self.config.registry_table.as_str();

        if !table_exists(conn, &serializer, registry)? {
            return Ok(IndexMap::new());
        }

        let sql = serializer.select_registry(registry);
        let rows = transaction::run(conn, |scope| scope.query_sql(&sql, &[]))?;

        rows.into_iter()
            .map(|mut row| {
                let table = match row.take(0)? {
                    Value::String(name) => name,
                    value => return Err(Error::type_conversion(value, "String")),
                };
                Ok((table, parse_version(row.take(1)?)?))
            })
            .collect()
    }

    /// Managed tables that already exist while the registry does not. A
    /// migration would record these at their current version without
    /// checking their columns.
    pub fn adoption_candidates<T: Table + ?Sized>(
        &self,
        conn: &mut dyn Connection,
        tables: &[&T],
    ) -> Result<Vec<String>> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);

        if table_exists(conn, &serializer, &self.config.registry_table)? {
            return Ok(vec![]);
        }

        let mut existing = vec![];
        for table in tables {
            if table_exists(conn, &serializer, table.table_name())? {
                existing.push(table.table_name().to_string());
            }
        }
        Ok(existing)
    }

    /// The registry's version for `table`, or `None` when it has no entry.
    pub fn stored_version<T: Table + ?Sized>(
        &self,
        conn: &mut dyn Connection,
        table: &T,
    ) -> Result<Option<u32>> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let registry = self.config.registry_table.as_str();

        if !table_exists(conn, &serializer, registry)? {
            return Ok(None);
        }
        stored_version_of(conn, &serializer, registry, table.table_name())
    }
}

fn table_exists(conn: &mut dyn Connection, serializer: &Serializer, name: &str) -> Result<bool> {
    let sql = serializer.table_exists();
    let mut rows = transaction::run(conn, |scope| scope.query_sql(&sql, &[Value::from(name)]))?;

    let Some(row) = rows.first_mut() else {
        return Err(Error::invalid_result("table existence check returned no row"));
    };
    match row.take(0)?.as_i64() {
        Some(count) => Ok(count > 0),
        None => Err(Error::invalid_result("table existence check returned no count")),
    }
}

fn stored_version_of(
    conn: &mut dyn Connection,
    serializer: &Serializer,
    registry: &str,
    name: &str,
) -> Result<Option<u32>> {
    let sql = serializer.select_registry_version(registry);
    let mut rows = transaction::run(conn, |scope| scope.query_sql(&sql, &[Value::from(name)]))?;

    match rows.first_mut() {
        Some(row) => parse_version(row.take(0)?).map(Some),
        None => Ok(None),
    }
}

fn insert_registry_row(
    scope: &mut Scope<'_>,
    serializer: &Serializer,
    registry: &str,
    name: &str,
    version: u32,
) -> Result<()> {
    let stmt = scope.prepare(&serializer.insert_registry_row(registry), false)?;
    scope.execute(stmt, &[Value::from(name), Value::I64(version.into())])?;
    Ok(())
}

fn update_registry_row(
    scope: &mut Scope<'_>,
    serializer: &Serializer,
    registry: &str,
    name: &str,
    version: u32,
) -> Result<()> {
    let stmt = scope.prepare(&serializer.update_registry_row(registry), false)?;
    let res = scope.execute(stmt, &[Value::I64(version.into()), Value::from(name)])?;

    if res.rows_affected != 1 {
        return Err(Error::invalid_result(format!(
            "registry update for {name} affected {} rows",
            res.rows_affected
        )));
    }
    Ok(())
}

fn parse_version(value: Value) -> Result<u32> {
    match value.as_i64().map(u32::try_from) {
        Some(Ok(version)) => Ok(version),
        _ => Err(Error::invalid_result(format!("invalid schema version {value}"))),
    }
}

