//! Units of work against a single connection.
//!
//! A [`Scope`] owns every statement prepared through it and closes them, in
//! reverse order of preparation, when it goes out of scope. This happens on
//! every exit path, including early returns through `?`. Failures to close
//! are logged and never replace the error that ended the unit of work.

use keel_core::{
    driver::{Capability, ExecResult, Rows, StatementId},
    Connection, Result, Value,
};
use tracing::{debug, warn};

pub struct Scope<'a> {
    conn: &'a mut dyn Connection,
    statements: Vec<StatementId>,
}

impl<'a> Scope<'a> {
    pub fn new(conn: &'a mut dyn Connection) -> Self {
        Scope {
            conn,
            statements: vec![],
        }
    }

    pub fn capability(&self) -> &Capability {
        self.conn.capability()
    }

    /// Prepares `sql` and registers the statement for cleanup.
    pub fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        let stmt = self.conn.prepare(sql, generated_keys)?;
        self.statements.push(stmt);
        Ok(stmt)
    }

    pub fn execute(&mut self, stmt: StatementId, params: &[Value]) -> Result<ExecResult> {
        self.conn.execute(stmt, params)
    }

    pub fn query(&mut self, stmt: StatementId, params: &[Value]) -> Result<Rows> {
        self.conn.query(stmt, params)
    }

    /// Prepares and executes a statement without parameters. The statement
    /// must not return rows; see [`Scope::query_sql`].
    pub fn exec_sql(&mut self, sql: &str) -> Result<ExecResult> {
        debug!(sql, "executing statement");
        let stmt = self.prepare(sql, false)?;
        self.execute(stmt, &[])
    }

    /// Prepares and runs a query.
    pub fn query_sql(&mut self, sql: &str, params: &[Value]) -> Result<Rows> {
        let stmt = self.prepare(sql, false)?;
        self.query(stmt, params)
    }

    /// Number of statements still open.
    pub fn open_statements(&self) -> usize {
        self.statements.len()
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        while let Some(stmt) = self.statements.pop() {
            if let Err(err) = self.conn.close_statement(stmt) {
                warn!(error = %err, ?stmt, "failed to close statement");
            }
        }
    }
}

/// Runs `f` against `conn` in auto-commit mode.
pub fn run<T>(conn: &mut dyn Connection, f: impl FnOnce(&mut Scope<'_>) -> Result<T>) -> Result<T> {
    let mut scope = Scope::new(conn);
    f(&mut scope)
}

/// Runs `f` inside a transaction.
///
/// The transaction commits when `f` succeeds and rolls back otherwise. A
/// failed commit is also rolled back. Statements opened by `f` are closed
/// before the transaction ends.
pub fn run_in_transaction<T>(
    conn: &mut dyn Connection,
    f: impl FnOnce(&mut Scope<'_>) -> Result<T>,
) -> Result<T> {
    conn.begin()?;

    let result = run(&mut *conn, f);

    let result = match result {
        Ok(value) => conn.commit().map(|_| value),
        Err(err) => Err(err),
    };

    if result.is_err() {
        if let Err(err) = conn.rollback() {
            warn!(error = %err, "failed to roll back transaction");
        }
    }

    result
}
