mod value;
pub(crate) use value::Value;

use keel_core::{
    driver::{Capability, ExecResult, Row, Rows, StatementId},
    Error, Result,
};
use mysql::{prelude::Queryable, Conn, Opts, Params, Statement};
use std::collections::HashMap;
use url::Url;

#[derive(Debug)]
pub struct MySQL {
    opts: Opts,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url_str}")))?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_connection_url(format!(
                "connection url does not have a `mysql` scheme; url={url}"
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_connection_url(format!(
                "missing host in connection URL; url={url}"
            )));
        }

        if url.path().is_empty() || url.path() == "/" {
            return Err(Error::invalid_connection_url(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        let opts = Opts::from_url(url.as_ref())
            .map_err(|err| Error::invalid_connection_url(format!("{err}; url={url}")))?;
        Ok(Self { opts })
    }

    pub fn connect(&self) -> Result<Connection> {
        let conn = Conn::new(self.opts.clone()).map_err(Error::driver)?;
        Ok(Connection::new(conn))
    }
}

/// A MySQL connection over the binary protocol.
///
/// MySQL commits implicitly around DDL, so a rollback only undoes the data
/// changes made since the last DDL statement.
#[derive(Debug)]
pub struct Connection {
    conn: Conn,
    statements: HashMap<StatementId, Prepared>,
    next_id: usize,
}

#[derive(Debug)]
struct Prepared {
    statement: Statement,
    generated_keys: bool,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn,
            statements: HashMap::new(),
            next_id: 0,
        }
    }

    fn prepared(&self, stmt: StatementId) -> Result<&Prepared> {
        self.statements
            .get(&stmt)
            .ok_or_else(|| Error::invalid_result(format!("unknown statement {stmt:?}")))
    }

    fn params(params: &[keel_core::Value]) -> Params {
        if params.is_empty() {
            return Params::Empty;
        }
        Params::Positional(
            params
                .iter()
                .cloned()
                .map(|value| Value::from(value).to_mysql())
                .collect(),
        )
    }
}

impl keel_core::driver::Connection for Connection {
    fn capability(&self) -> &Capability {
        &Capability::MYSQL
    }

    fn prepare(&mut self, sql: &str, generated_keys: bool) -> Result<StatementId> {
        let statement = self.conn.prep(sql).map_err(Error::driver)?;

        let id = StatementId(self.next_id);
        self.next_id += 1;
        self.statements.insert(
            id,
            Prepared {
                statement,
                generated_keys,
            },
        );
        Ok(id)
    }

    fn execute(&mut self, stmt: StatementId, params: &[keel_core::Value]) -> Result<ExecResult> {
        let prepared = self.prepared(stmt)?;
        let statement = prepared.statement.clone();
        let generated_keys = prepared.generated_keys;

        self.conn
            .exec_drop(&statement, Self::params(params))
            .map_err(Error::driver)?;

        let rows_affected = self.conn.affected_rows();
        let generated_keys = if generated_keys && rows_affected > 0 {
            let id = i64::try_from(self.conn.last_insert_id()).map_err(|_| {
                Error::invalid_result("generated key does not fit in a signed 64-bit integer")
            })?;
            vec![keel_core::Value::I64(id)]
        } else {
            vec![]
        };

        Ok(ExecResult {
            rows_affected,
            generated_keys,
        })
    }

    fn query(&mut self, stmt: StatementId, params: &[keel_core::Value]) -> Result<Rows> {
        let statement = self.prepared(stmt)?.statement.clone();

        let rows: Vec<mysql::Row> = self
            .conn
            .exec(&statement, Self::params(params))
            .map_err(Error::driver)?;

        rows.iter()
            .map(|row| {
                let values = (0..row.len())
                    .map(|index| match row.as_ref(index) {
                        Some(value) => Value::from_mysql(value, index).map(Value::into_inner),
                        None => Ok(keel_core::Value::Null),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row::new(values))
            })
            .collect()
    }

    fn close_statement(&mut self, stmt: StatementId) -> Result<()> {
        let Some(prepared) = self.statements.remove(&stmt) else {
            return Err(Error::invalid_result(format!("statement {stmt:?} is not open")));
        };
        self.conn.close(prepared.statement).map_err(Error::driver)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn
            .query_drop("START TRANSACTION")
            .map_err(Error::driver)
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.query_drop("COMMIT").map_err(Error::driver)
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.query_drop("ROLLBACK").map_err(Error::driver)
    }
}
