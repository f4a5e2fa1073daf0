use keel::{
    driver::{Capability, ExecResult, Rows, StatementId},
    Connection, Error, Result, Value,
};
use std::collections::HashSet;

/// A connection wrapper that injects driver errors.
///
/// The `nth` statement (1-based) whose SQL contains `pattern` fails when it
/// is executed. Statements can also be made to fail when closed.
#[derive(Debug)]
pub struct FaultyConnection<C> {
    inner: C,
    pattern: Option<String>,
    nth: usize,
    seen: usize,
    doomed: HashSet<StatementId>,
    fail_close: bool,
}

impl<C: Connection> FaultyConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            pattern: None,
            nth: 0,
            seen: 0,
            doomed: HashSet::new(),
            fail_close: false,
        }
    }

    /// Fails the execution of the `nth` statement containing `pattern`.
    pub fn fail_nth(mut self, pattern: &str, nth: usize) -> Self {
        self.pattern = Some(pattern.to_string());
        self.nth = nth;
        self
    }

    /// Fails every `close_statement` call, after closing the statement.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Stops injecting faults.
    pub fn heal(&mut self) {
        self.pattern = None;
        self.doomed.clear();
        self.fail_close = false;
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn injected(stmt: StatementId) -> Error {
        Error::driver(std::io::Error::other(format!(
            "injected failure for {stmt:?}"
        )))
    }
}

impl<C: Connection> Connection for FaultyConnection<C> {
    fn capability(&self) -> &Capability {
        self.inner.capability()
    }

    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        let stmt = self.inner.prepare(sql, generated_keys)?;

        if let Some(pattern) = &self.pattern {
            if sql.contains(pattern.as_str()) {
                self.seen += 1;
                if self.seen == self.nth {
                    self.doomed.insert(stmt);
                }
            }
        }
        Ok(stmt)
    }

    fn execute(&mut self, stmt: StatementId, params: &[Value]) -> Result<ExecResult> {
        if self.doomed.contains(&stmt) {
            return Err(Self::injected(stmt));
        }
        self.inner.execute(stmt, params)
    }

    fn query(&mut self, stmt: StatementId, params: &[Value]) -> Result<Rows> {
        if self.doomed.contains(&stmt) {
            return Err(Self::injected(stmt));
        }
        self.inner.query(stmt, params)
    }

    fn close_statement(&mut self, stmt: StatementId) -> Result<()> {
        self.doomed.remove(&stmt);
        self.inner.close_statement(stmt)?;

        if self.fail_close {
            return Err(Self::injected(stmt));
        }
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }
}
