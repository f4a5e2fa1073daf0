mod value;
pub(crate) use value::Value;

use keel_core::{
    driver::{Capability, ExecResult, Row, Rows, StatementId},
    Error, Result,
};
use rusqlite::Connection as RusqliteConnection;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(|err| {
            Error::invalid_connection_url(format!("{err}; url={url_str}"))
        })?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    pub fn connect(&self) -> Result<Connection> {
        match self {
            Sqlite::File(path) => Connection::open(path),
            Sqlite::InMemory => Connection::in_memory(),
        }
    }
}

/// A SQLite connection.
///
/// Statements are kept as SQL text and compiled through rusqlite's
/// statement cache on each execution.
#[derive(Debug)]
pub struct Connection {
    connection: RusqliteConnection,
    statements: HashMap<StatementId, Prepared>,
    next_id: usize,
}

#[derive(Debug)]
struct Prepared {
    sql: String,
    generated_keys: bool,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection = RusqliteConnection::open_in_memory().map_err(Error::driver)?;
        Ok(Self::new(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver)?;
        Ok(Self::new(connection))
    }

    fn new(connection: RusqliteConnection) -> Self {
        Self {
            connection,
            statements: HashMap::new(),
            next_id: 0,
        }
    }

    fn prepared(&self, stmt: StatementId) -> Result<&Prepared> {
        self.statements
            .get(&stmt)
            .ok_or_else(|| Error::invalid_result(format!("unknown statement {stmt:?}")))
    }

    fn batch(&self, sql: &str) -> Result<()> {
        self.connection.execute_batch(sql).map_err(Error::driver)
    }
}

impl keel_core::driver::Connection for Connection {
    fn capability(&self) -> &Capability {
        &Capability::SQLITE
    }

    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        // Compile once so syntax errors surface here rather than on execution.
        self.connection.prepare_cached(sql).map_err(Error::driver)?;

        let id = StatementId(self.next_id);
        self.next_id += 1;
        self.statements.insert(
            id,
            Prepared {
                sql: sql.to_string(),
                generated_keys,
            },
        );
        Ok(id)
    }

    fn execute(&mut self, stmt: StatementId, params: &[keel_core::Value]) -> Result<ExecResult> {
        let prepared = self.prepared(stmt)?;
        let mut statement = self
            .connection
            .prepare_cached(&prepared.sql)
            .map_err(Error::driver)?;

        let params = params.iter().cloned().map(Value::from);
        let rows_affected = statement
            .execute(rusqlite::params_from_iter(params))
            .map_err(Error::driver)?;

        let generated_keys = if prepared.generated_keys && rows_affected > 0 {
            vec![keel_core::Value::I64(self.connection.last_insert_rowid())]
        } else {
            vec![]
        };

        Ok(ExecResult {
            rows_affected: rows_affected as u64,
            generated_keys,
        })
    }

    fn query(&mut self, stmt: StatementId, params: &[keel_core::Value]) -> Result<Rows> {
        let prepared = self.prepared(stmt)?;
        let mut statement = self
            .connection
            .prepare_cached(&prepared.sql)
            .map_err(Error::driver)?;
        let width = statement.column_count();

        let params = params.iter().cloned().map(Value::from);
        let mut rows = statement
            .query(rusqlite::params_from_iter(params))
            .map_err(Error::driver)?;

        let mut ret = vec![];
        while let Some(row) = rows.next().map_err(Error::driver)? {
            let values = (0..width)
                .map(|index| Value::from_sql(row, index).map(Value::into_inner))
                .collect::<Result<Vec<_>>>()?;
            ret.push(Row::new(values));
        }
        Ok(ret)
    }

    fn close_statement(&mut self, stmt: StatementId) -> Result<()> {
        match self.statements.remove(&stmt) {
            Some(_) => Ok(()),
            None => Err(Error::invalid_result(format!(
                "statement {stmt:?} is not open"
            ))),
        }
    }

    fn begin(&mut self) -> Result<()> {
        self.batch("BEGIN")
    }

    fn commit(&mut self) -> Result<()> {
        self.batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        self.batch("ROLLBACK")
    }
}
