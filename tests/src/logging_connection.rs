use crate::{ExecLog, Op};
use keel::{
    driver::{Capability, ExecResult, Rows, StatementId},
    Connection, Result, Value,
};

/// A connection wrapper that records every prepared statement and
/// transaction boundary.
#[derive(Debug)]
pub struct LoggingConnection {
    inner: Box<dyn Connection>,
    log: ExecLog,
}

impl LoggingConnection {
    pub fn new(inner: Box<dyn Connection>) -> Self {
        Self {
            inner,
            log: ExecLog::default(),
        }
    }

    /// Get a handle to the log, usable after the connection has been moved.
    pub fn log(&self) -> ExecLog {
        self.log.clone()
    }
}

impl Connection for LoggingConnection {
    fn capability(&self) -> &Capability {
        self.inner.capability()
    }

    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        let stmt = self.inner.prepare(sql, generated_keys)?;
        self.log.push(Op::Prepare(stmt, sql.to_string()));
        Ok(stmt)
    }

    fn execute(&mut self, stmt: StatementId, params: &[Value]) -> Result<ExecResult> {
        self.inner.execute(stmt, params)
    }

    fn query(&mut self, stmt: StatementId, params: &[Value]) -> Result<Rows> {
        self.inner.query(stmt, params)
    }

    fn close_statement(&mut self, stmt: StatementId) -> Result<()> {
        self.log.push(Op::Close(stmt));
        self.inner.close_statement(stmt)
    }

    fn begin(&mut self) -> Result<()> {
        self.log.push(Op::Begin);
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.log.push(Op::Commit);
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.log.push(Op::Rollback);
        self.inner.rollback()
    }
}
