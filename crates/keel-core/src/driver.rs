mod capability;
pub use capability::{Capability, Flavor};

mod response;
pub use response::{ExecResult, Row, Rows};

use crate::{Result, Value};

use std::fmt::Debug;

/// Handle to a statement prepared on a [`Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId(pub usize);

/// A single, exclusively used database connection.
///
/// Every call blocks on the driver round-trip. Prepared statements stay open
/// until [`Connection::close_statement`] is called for them; callers are
/// expected to close them through a cleanup scope.
pub trait Connection: Debug + Send {
    /// Describes the database behind this connection, which informs SQL
    /// generation.
    fn capability(&self) -> &Capability;

    /// Prepares `sql`. When `generated_keys` is set, executions report the
    /// keys the database generated for inserted rows.
    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId>;

    /// Executes a prepared statement that returns no rows.
    fn execute(&mut self, stmt: StatementId, params: &[Value]) -> Result<ExecResult>;

    /// Executes a prepared query and returns every row.
    fn query(&mut self, stmt: StatementId, params: &[Value]) -> Result<Rows>;

    fn close_statement(&mut self, stmt: StatementId) -> Result<()>;

    /// Turns off auto-commit until [`Connection::commit`] or
    /// [`Connection::rollback`].
    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn capability(&self) -> &Capability {
        (**self).capability()
    }

    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        (**self).prepare(sql, generated_keys)
    }

    fn execute(&mut self, stmt: StatementId, params: &[Value]) -> Result<ExecResult> {
        (**self).execute(stmt, params)
    }

    fn query(&mut self, stmt: StatementId, params: &[Value]) -> Result<Rows> {
        (**self).query(stmt, params)
    }

    fn close_statement(&mut self, stmt: StatementId) -> Result<()> {
        (**self).close_statement(stmt)
    }

    fn begin(&mut self) -> Result<()> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<()> {
        (**self).rollback()
    }
}
