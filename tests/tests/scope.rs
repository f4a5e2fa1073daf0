use keel::{
    driver::StatementId,
    transaction::{run, run_in_transaction},
    Error,
};
use tests::{columns, count_rows, sqlite, FaultyConnection, LoggingConnection, Op};

fn logged() -> LoggingConnection {
    LoggingConnection::new(sqlite())
}

#[test]
fn statements_close_in_reverse_order() {
    let mut conn = logged();
    let log = conn.log();

    let opened = run(&mut conn, |scope| {
        let a = scope.prepare("SELECT 1", false)?;
        let b = scope.prepare("SELECT 2", false)?;
        let c = scope.prepare("SELECT 3", false)?;
        assert_eq!(scope.open_statements(), 3);
        Ok(vec![a, b, c])
    })
    .unwrap();

    let closed: Vec<StatementId> = log
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            Op::Close(id) => Some(id),
            _ => None,
        })
        .collect();

    assert_eq!(closed, opened.into_iter().rev().collect::<Vec<_>>());
}

#[test]
fn statements_close_on_error() {
    let mut conn = logged();
    let log = conn.log();

    let err = run(&mut conn, |scope| {
        scope.prepare("SELECT 1", false)?;
        scope.exec_sql("CREATE TABLE t (id int)")?;
        scope.exec_sql("CREATE TABLE t (id int)")?;
        Ok(())
    })
    .unwrap_err();

    assert!(err.is_driver());
    assert!(log.open_statements().is_empty());
}

#[test]
fn close_failures_do_not_mask_the_error() {
    let mut conn = FaultyConnection::new(logged()).fail_close();
    let log = conn.inner().log();

    let err = run(&mut conn, |scope| {
        scope.prepare("SELECT 1", false)?;
        scope.prepare("SELECT 2", false)?;
        Err::<(), _>(Error::invalid_result("unit of work failed"))
    })
    .unwrap_err();

    assert_eq!(err.to_string(), "invalid result: unit of work failed");
    assert!(log.open_statements().is_empty());

    // Close failures alone do not fail the unit of work either.
    let rows = run(&mut conn, |scope| scope.query_sql("SELECT 1", &[])).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn transaction_commits_on_success() {
    let mut conn = logged();
    let log = conn.log();

    run_in_transaction(&mut conn, |scope| {
        scope.exec_sql("CREATE TABLE t (id int)")?;
        scope.exec_sql("INSERT INTO t VALUES (1)")?;
        Ok(())
    })
    .unwrap();
    let ops = log.ops();

    assert_eq!(count_rows(&mut conn, "t"), 1);
    assert_eq!(log.count(&Op::Commit), 1);
    assert_eq!(log.count(&Op::Rollback), 0);

    // Statements are closed before the transaction ends.
    let commit = ops.iter().position(|op| *op == Op::Commit).unwrap();
    let last_close = ops.iter().rposition(|op| matches!(op, Op::Close(_))).unwrap();
    assert!(last_close < commit);
}

#[test]
fn transaction_rolls_back_on_error() {
    let mut conn = FaultyConnection::new(logged()).fail_nth("INSERT", 2);
    let log = conn.inner().log();

    run(&mut conn, |scope| {
        scope.exec_sql("CREATE TABLE t (id int)").map(|_| ())
    })
    .unwrap();

    let err = run_in_transaction(&mut conn, |scope| {
        scope.exec_sql("ALTER TABLE t ADD COLUMN name varchar(10)")?;
        scope.exec_sql("INSERT INTO t VALUES (1, 'a')")?;
        scope.exec_sql("INSERT INTO t VALUES (2, 'b')")?;
        Ok(())
    })
    .unwrap_err();

    assert!(err.is_driver());
    assert_eq!(log.count(&Op::Rollback), 1);

    let mut conn = conn.into_inner();
    assert_eq!(count_rows(&mut conn, "t"), 0);
    assert_eq!(columns(&mut conn, "t"), ["id"]);
}
