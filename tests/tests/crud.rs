use keel::Engine;
use pretty_assertions::assert_eq;
use tests::models::{problem_index, problem_v2, sample_problem, Problem, ProblemType};
use tests::{count_rows, indices, setup, LoggingConnection};

fn migrated() -> (Engine, LoggingConnection) {
    let (engine, mut conn) = setup();
    engine.migrate(&mut conn, &[&problem_v2()]).unwrap();
    (engine, conn)
}

fn midterm() -> Problem {
    Problem {
        id: 0,
        course_id: 7,
        testname: "fib".into(),
        brief: "Compute the nth Fibonacci number".into(),
        problem_type: ProblemType::PythonFunction,
        visible: false,
        author: Some("dhovemey".into()),
    }
}

#[test]
fn store_then_load_round_trips() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    let original = midterm();
    let mut stored = original.clone();
    engine.store(&mut conn, &mut stored, &schema).unwrap();
    assert_ne!(stored.id, 0);

    let mut loaded = Problem {
        id: stored.id,
        ..Problem::default()
    };
    engine.load_by_id(&mut conn, &mut loaded, &schema).unwrap();

    assert_eq!(loaded, Problem { id: stored.id, ..original });
}

#[test]
fn nullable_fields_round_trip_as_none() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    let mut problem = Problem {
        author: None,
        ..midterm()
    };
    engine.store(&mut conn, &mut problem, &schema).unwrap();

    let mut loaded = Problem {
        id: problem.id,
        author: Some("placeholder".into()),
        ..Problem::default()
    };
    engine.load_by_id(&mut conn, &mut loaded, &schema).unwrap();
    assert_eq!(loaded.author, None);
}

#[test]
fn update_writes_every_field() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    let mut problem = midterm();
    engine.store(&mut conn, &mut problem, &schema).unwrap();

    problem.brief = "Compute Fibonacci numbers iteratively".into();
    problem.visible = true;
    problem.problem_type = ProblemType::JavaMethod;
    engine.update(&mut conn, &problem, &schema).unwrap();

    let mut loaded = Problem {
        id: problem.id,
        ..Problem::default()
    };
    engine.load_by_id(&mut conn, &mut loaded, &schema).unwrap();
    assert_eq!(loaded, problem);
}

#[test]
fn load_missing_row() {
    let (engine, mut conn) = migrated();

    let mut missing = Problem {
        id: 404,
        ..Problem::default()
    };
    let err = engine
        .load_by_id(&mut conn, &mut missing, &problem_v2())
        .unwrap_err();

    assert!(err.is_record_not_found());
    assert_eq!(err.to_string(), "record not found: table=problems id=404");
}

#[test]
fn store_all_captures_ids_in_order() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();
    let log = conn.log();
    let mark = log.len();

    let mut problems: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| Problem {
            testname: name.into(),
            ..midterm()
        })
        .collect();
    engine.store_all(&mut conn, &mut problems, &schema).unwrap();

    // The seed row holds id 1.
    let ids: Vec<_> = problems.iter().map(|p| p.id).collect();
    assert_eq!(ids, [2, 3, 4]);

    // One statement for the whole batch.
    assert_eq!(log.statements_since(mark).len(), 1);

    for problem in &problems {
        let mut loaded = Problem {
            id: problem.id,
            ..Problem::default()
        };
        engine.load_by_id(&mut conn, &mut loaded, &schema).unwrap();
        assert_eq!(&loaded, problem);
    }
}

#[test]
fn store_exact_keeps_the_identity() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    let problem = Problem { id: 50, ..midterm() };
    engine.store_exact(&mut conn, &problem, &schema).unwrap();

    let mut loaded = Problem {
        id: 50,
        ..Problem::default()
    };
    engine.load_by_id(&mut conn, &mut loaded, &schema).unwrap();
    assert_eq!(loaded, problem);

    let err = engine.store_exact(&mut conn, &problem, &schema).unwrap_err();
    assert!(err.is_driver());
}

#[test]
fn get_all_uses_the_factory() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    let mut problem = midterm();
    engine.store(&mut conn, &mut problem, &schema).unwrap();

    let all = engine
        .get_all(&mut conn, &schema, Problem::default)
        .unwrap();
    assert_eq!(all, [sample_problem(), problem]);
}

#[test]
fn create_index_on_existing_table() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();

    engine
        .create_index(&mut conn, &schema, &problem_index())
        .unwrap();
    assert!(indices(&mut conn, "problems").contains(&"problems_problem_idx_1".to_string()));

    let mut first = midterm();
    engine.store(&mut conn, &mut first, &schema).unwrap();

    let mut duplicate = midterm();
    let err = engine.store(&mut conn, &mut duplicate, &schema).unwrap_err();
    assert!(err.is_driver());
    assert_eq!(count_rows(&mut conn, "problems"), 2);
}

#[test]
fn exec_sql_reports_affected_rows() {
    let (engine, mut conn) = migrated();

    let res = engine
        .exec_sql(&mut conn, "UPDATE problems SET visible = 0")
        .unwrap();
    assert_eq!(res.rows_affected, 1);
}

#[test]
fn exec_sql_rejects_queries_on_sqlite() {
    let (engine, mut conn) = migrated();
    let log = conn.log();

    let err = engine
        .exec_sql(&mut conn, "SELECT problem_id FROM problems")
        .unwrap_err();
    assert!(err.has_driver_cause());
    assert!(log.open_statements().is_empty());
}

#[test]
fn operations_close_their_statements() {
    let (engine, mut conn) = migrated();
    let schema = problem_v2();
    let log = conn.log();

    let mut problem = midterm();
    engine.store(&mut conn, &mut problem, &schema).unwrap();
    engine.update(&mut conn, &problem, &schema).unwrap();
    engine.get_all(&mut conn, &schema, Problem::default).unwrap();

    let mut missing = Problem {
        id: 404,
        ..Problem::default()
    };
    engine
        .load_by_id(&mut conn, &mut missing, &schema)
        .unwrap_err();

    assert!(log.open_statements().is_empty());
}
