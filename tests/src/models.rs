//! Model types shared by the integration tests, each with a short version
//! history.

use keel::{Field, MultiFieldIndex, PersistedEnum, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ProblemType {
    #[default]
    JavaMethod,
    PythonFunction,
    CProgram,
}

impl PersistedEnum for ProblemType {
    const TAGS: &'static [(Self, i32)] = &[
        (ProblemType::JavaMethod, 0),
        (ProblemType::PythonFunction, 2),
        (ProblemType::CProgram, 5),
    ];
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    pub id: i32,
    pub course_id: i32,
    pub testname: String,
    pub brief: String,
    pub problem_type: ProblemType,
    pub visible: bool,
    pub author: Option<String>,
}

pub fn problem_v0() -> Schema<Problem> {
    Schema::builder("problem")
        .field(Field::int("problem_id", |p: &Problem| p.id, |p, v| p.id = v).identity())
        .field(Field::int("course_id", |p: &Problem| p.course_id, |p, v| p.course_id = v).non_unique())
        .field(Field::string("testname", 20, |p: &Problem| p.testname.clone(), |p, v| p.testname = v))
        .field(Field::string("brief", 60, |p: &Problem| p.brief.clone(), |p, v| p.brief = v))
        .field(Field::enumeration(
            "problem_type",
            |p: &Problem| p.problem_type,
            |p, v| p.problem_type = v,
        ))
        .build()
        .unwrap()
}

/// Adds `visible` and a seed problem.
pub fn problem_v1() -> Schema<Problem> {
    Schema::based_on(problem_v0())
        .add_after(
            "brief",
            Field::bool("visible", |p: &Problem| p.visible, |p, v| p.visible = v).non_unique(),
        )
        .persist(sample_problem())
        .build()
        .unwrap()
}

/// Widens `brief` and adds a nullable `author` after `testname`.
pub fn problem_v2() -> Schema<Problem> {
    Schema::based_on(problem_v1())
        .increase_size("brief", 200)
        .add_after(
            "testname",
            Field::string("author", 40, |p: &Problem| p.author.clone(), |p, v| p.author = v),
        )
        .build()
        .unwrap()
}

pub fn sample_problem() -> Problem {
    Problem {
        id: 1,
        course_id: 1,
        testname: "hello".into(),
        brief: "Print a greeting".into(),
        problem_type: ProblemType::CProgram,
        visible: true,
        author: None,
    }
}

/// `problem_v2` with a unique index on `(course_id, testname)`.
pub fn problem_index() -> MultiFieldIndex {
    MultiFieldIndex::unique(1, &["course_id", "testname"])
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub term: String,
    pub room: String,
    pub seats: i32,
    pub credits: i16,
}

pub fn course_v0() -> Schema<Course> {
    Schema::builder("course")
        .table_prefix("cc_")
        .field(Field::long("id", |c: &Course| c.id, |c, v| c.id = v).identity())
        .field(Field::string("title", 30, |c: &Course| c.title.clone(), |c, v| c.title = v))
        .build()
        .unwrap()
}

pub fn course_v1() -> Schema<Course> {
    Schema::based_on(course_v0())
        .persist(Course {
            id: 1,
            title: "CS 101".into(),
            ..Course::default()
        })
        .build()
        .unwrap()
}

pub fn course_v2() -> Schema<Course> {
    Schema::based_on(course_v1())
        .add_after(
            "title",
            Field::string("term", 20, |c: &Course| c.term.clone(), |c, v| c.term = v).non_unique(),
        )
        .build()
        .unwrap()
}

/// Widens `title` and seeds a course that needs the `term` column of
/// version 2.
pub fn course_v3() -> Schema<Course> {
    Schema::based_on(course_v2())
        .increase_size("title", 100)
        .persist(Course {
            id: 2,
            title: "CS 201".into(),
            term: "Fall".into(),
            ..Course::default()
        })
        .build()
        .unwrap()
}

/// Three added columns in one version.
pub fn course_v4() -> Schema<Course> {
    Schema::based_on(course_v3())
        .add_after(
            "term",
            Field::string("room", 10, |c: &Course| c.room.clone(), |c, v| c.room = v),
        )
        .add_after(
            "room",
            Field::int("seats", |c: &Course| c.seats, |c, v| c.seats = v),
        )
        .add_after(
            "seats",
            Field::short("credits", |c: &Course| c.credits, |c, v| c.credits = v),
        )
        .build()
        .unwrap()
}
