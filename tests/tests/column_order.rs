//! Column order must agree between `CREATE TABLE`, the insert and update
//! statements, and the marshaller, for any schema.

use keel::{marshal, Field, Schema, Serializer, Value};
use keel_sql::Slot;
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tests::setup;

/// A model whose fields are backed by slots chosen at random.
#[derive(Debug, Clone, Default, PartialEq)]
struct Record {
    ints: Vec<i32>,
    strings: Vec<String>,
}

enum Kind {
    Int(usize),
    String(usize),
}

struct Generated {
    schema: Schema<Record>,
    names: Vec<String>,
    kinds: Vec<(String, Kind)>,
    slots: Slots,
}

fn field(name: &str, kind: &Kind, size: u32) -> Field<Record> {
    match *kind {
        Kind::Int(slot) => Field::int(name, move |r: &Record| r.ints[slot], move |r, v| r.ints[slot] = v),
        Kind::String(slot) => Field::string(
            name,
            size,
            move |r: &Record| r.strings[slot].clone(),
            move |r, v| r.strings[slot] = v,
        ),
    }
}

#[derive(Default)]
struct Slots {
    ints: usize,
    strings: usize,
}

impl Slots {
    fn int(&mut self) -> Kind {
        self.ints += 1;
        Kind::Int(self.ints - 1)
    }

    fn random(&mut self, rng: &mut StdRng) -> Kind {
        if rng.gen_bool(0.5) {
            self.int()
        } else {
            self.strings += 1;
            Kind::String(self.strings - 1)
        }
    }
}

/// A base version with random fields, optionally an identity, followed by a
/// derived version inserting more fields at random positions.
fn generate(rng: &mut StdRng) -> Generated {
    let mut slots = Slots::default();
    let mut names = vec![];
    let mut kinds = vec![];

    let mut base = Schema::builder("record");

    if rng.gen_bool(0.7) {
        let kind = slots.int();
        base = base.field(field("id", &kind, 0).identity());
        names.push("id".to_string());
        kinds.push(("id".to_string(), kind));
    }

    for _ in 0..rng.gen_range(1..8) {
        let name = format!("c{}", kinds.len());
        let kind = slots.random(rng);
        base = base.field(field(&name, &kind, rng.gen_range(4..64)));
        names.push(name.clone());
        kinds.push((name, kind));
    }

    let mut derived = Schema::based_on(base.build().unwrap());
    for _ in 0..rng.gen_range(0..5) {
        let name = format!("c{}", kinds.len());
        let kind = slots.random(rng);
        let after = rng.gen_range(0..names.len());

        derived = derived.add_after(&names[after], field(&name, &kind, rng.gen_range(4..64)));
        names.insert(after + 1, name.clone());
        kinds.push((name, kind));
    }

    Generated {
        schema: derived.build().unwrap(),
        names,
        kinds,
        slots,
    }
}

/// An instance where every field's value identifies the field.
fn instance(generated: &Generated) -> Record {
    let mut record = empty(generated);
    for (position, (name, kind)) in generated.kinds.iter().enumerate() {
        match *kind {
            Kind::Int(slot) => record.ints[slot] = position as i32 + 100,
            Kind::String(slot) => record.strings[slot] = name.clone(),
        }
    }
    record
}

fn empty(generated: &Generated) -> Record {
    Record {
        ints: vec![0; generated.slots.ints],
        strings: vec![String::new(); generated.slots.strings],
    }
}

/// Maps a bound value back to the name of the field it came from.
fn field_name(generated: &Generated, value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        Value::I32(tag) => generated.kinds[(*tag - 100) as usize].0.clone(),
        other => panic!("unexpected bound value {other}"),
    }
}

/// Column names in the order `CREATE TABLE` declares them.
fn created_columns(sql: &str, quote: char) -> Vec<String> {
    sql.lines()
        .skip(1)
        .map(str::trim_start)
        .filter(|line| line.starts_with(quote))
        .map(|line| line.split(quote).nth(1).unwrap().to_string())
        .collect()
}

#[test]
fn random_schemas_agree_on_column_order() {
    let mut rng = StdRng::seed_from_u64(0x6b65656c);

    for _ in 0..200 {
        let generated = generate(&mut rng);
        let schema = &generated.schema;
        let record = instance(&generated);

        let declared: Vec<String> = schema.fields().map(|f| f.name().to_string()).collect();
        assert_eq!(declared, generated.names);

        let mysql = Serializer::mysql();
        assert_eq!(created_columns(&mysql.create_table(schema), '`'), declared);

        let sqlite = Serializer::sqlite();
        assert_eq!(created_columns(&sqlite.create_table(schema), '"'), declared);

        // Insert: every parameter slot lines up with the field bound to it.
        let mut params = vec![];
        marshal::bind_for_insert(&record, schema, &mut params).unwrap();

        let slots = mysql.insert_slots(schema, false);
        assert_eq!(slots.len(), declared.len());

        let param_columns: Vec<_> = slots
            .iter()
            .zip(&declared)
            .filter(|(slot, _)| **slot == Slot::Param)
            .map(|(_, name)| name.clone())
            .collect();
        let bound: Vec<_> = params.iter().map(|v| field_name(&generated, v)).collect();
        assert_eq!(bound, param_columns);

        // Update: assignments in the same order as the bound values.
        let mut params = vec![];
        let next = marshal::bind_for_update(&record, schema, &mut params).unwrap();
        assert_eq!(next, params.len());

        let assigned: Vec<_> = mysql
            .update_placeholders(schema, false)
            .split(", ")
            .map(|assignment| assignment.split('`').nth(1).unwrap().to_string())
            .collect();
        let bound: Vec<_> = params.iter().map(|v| field_name(&generated, v)).collect();
        assert_eq!(bound, assigned);
    }
}

#[test]
fn random_schemas_round_trip_through_sqlite() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..25 {
        let generated = generate(&mut rng);
        let schema = &generated.schema;
        if !schema.has_unique_id() {
            continue;
        }

        let (engine, mut conn) = setup();
        engine.migrate(&mut conn, &[schema]).unwrap();

        let mut stored = instance(&generated);
        engine.store(&mut conn, &mut stored, schema).unwrap();

        let loaded = engine
            .get_all(&mut conn, schema, || empty(&generated))
            .unwrap();
        assert_eq!(loaded, [stored]);
    }
}
