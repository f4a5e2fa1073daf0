use crate::{
    marshal,
    transaction::{self, Scope},
    Engine,
};

use keel_core::{
    driver::ExecResult,
    schema::{MultiFieldIndex, Schema},
    Connection, Error, Result, Value,
};
use keel_sql::Serializer;
use tracing::debug;

impl Engine {
    /// Inserts `instance` and writes the database-generated key into its
    /// identity field.
    pub fn store<M>(
        &self,
        conn: &mut dyn Connection,
        instance: &mut M,
        schema: &Schema<M>,
    ) -> Result<()> {
        self.store_all(conn, std::slice::from_mut(instance), schema)
    }

    /// Inserts every instance through one prepared statement, then writes
    /// the generated keys into their identity fields in order.
    pub fn store_all<M>(
        &self,
        conn: &mut dyn Connection,
        instances: &mut [M],
        schema: &Schema<M>,
    ) -> Result<()> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let sql = serializer.insert(schema);
        let has_id = schema.has_unique_id();

        let keys = transaction::run(conn, |scope| {
            let stmt = scope.prepare(&sql, has_id)?;
            let mut keys = Vec::with_capacity(instances.len());

            for instance in instances.iter() {
                let mut params = vec![];
                marshal::bind_for_insert(instance, schema, &mut params)?;
                let res = scope.execute(stmt, &params)?;
                keys.extend(res.generated_keys);
            }
            Ok(keys)
        })?;

        if has_id {
            marshal::capture_generated_ids(instances, schema, &keys)?;
        }
        Ok(())
    }

    /// Inserts `instance` keeping the identity value it already holds.
    pub fn store_exact<M>(
        &self,
        conn: &mut dyn Connection,
        instance: &M,
        schema: &Schema<M>,
    ) -> Result<()> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        transaction::run(conn, |scope| insert_exact(scope, &serializer, schema, instance))
    }

    /// Writes every non-identity field of `instance` to the row with the
    /// same identity.
    pub fn update<M>(
        &self,
        conn: &mut dyn Connection,
        instance: &M,
        schema: &Schema<M>,
    ) -> Result<()> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let sql = serializer.update(schema)?;
        let id = schema.unique_id_field()?;

        let mut params = vec![];
        let next = marshal::bind_for_update(instance, schema, &mut params)?;
        debug_assert_eq!(next, params.len());
        params.push(id.get(instance)?);

        transaction::run(conn, |scope| {
            let stmt = scope.prepare(&sql, false)?;
            scope.execute(stmt, &params)?;
            Ok(())
        })
    }

    /// Loads the row whose identity matches the one set on `instance` into
    /// `instance`.
    pub fn load_by_id<M>(
        &self,
        conn: &mut dyn Connection,
        instance: &mut M,
        schema: &Schema<M>,
    ) -> Result<()> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let sql = serializer.select_by_id(schema)?;
        let id = schema.unique_id_field()?.get(instance)?;

        let mut rows = transaction::run(conn, |scope| scope.query_sql(&sql, &[id.clone()]))?;

        let Some(row) = rows.first_mut() else {
            return Err(Error::record_not_found(format!(
                "table={} id={id}",
                schema.table_name()
            )));
        };

        marshal::load_fields(instance, schema, row, 0)?;
        Ok(())
    }

    /// Loads every row of the table, creating instances with `factory`.
    pub fn get_all<M>(
        &self,
        conn: &mut dyn Connection,
        schema: &Schema<M>,
        factory: impl Fn() -> M,
    ) -> Result<Vec<M>> {
        let _enter = self.span.enter();
        let serializer = self.serializer(conn);
        let sql = serializer.select_all(schema);

        let rows = transaction::run(conn, |scope| scope.query_sql(&sql, &[]))?;

        rows.into_iter()
            .map(|mut row| {
                let mut instance = factory();
                marshal::load_fields(&mut instance, schema, &mut row, 0)?;
                Ok(instance)
            })
            .collect()
    }

    /// Executes a statement that has no parameters.
    ///
    /// The statement must not return rows. Drivers differ on row-returning
    /// SQL here: SQLite rejects it and MySQL discards the rows. Use
    /// [`Scope::query_sql`](crate::Scope::query_sql) for queries.
    pub fn exec_sql(&self, conn: &mut dyn Connection, sql: &str) -> Result<ExecResult> {
        let _enter = self.span.enter();
        transaction::run(conn, |scope| scope.exec_sql(sql))
    }

    /// Creates a multi-field index on an existing table.
    pub fn create_index<M>(
        &self,
        conn: &mut dyn Connection,
        schema: &Schema<M>,
        index: &MultiFieldIndex,
    ) -> Result<()> {
        let _enter = self.span.enter();
        let sql = self.serializer(conn).create_index(schema, index);
        transaction::run(conn, |scope| scope.exec_sql(&sql).map(|_| ()))
    }
}

/// Inserts `instance` with its identity as given.
pub(crate) fn insert_exact<M>(
    scope: &mut Scope<'_>,
    serializer: &Serializer,
    schema: &Schema<M>,
    instance: &M,
) -> Result<()> {
    let sql = serializer.insert_exact(schema);
    debug!(sql, "inserting row");

    let mut params: Vec<Value> = vec![];
    marshal::bind_exact(instance, schema, &mut params)?;

    let stmt = scope.prepare(&sql, false)?;
    scope.execute(stmt, &params)?;
    Ok(())
}
