// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Stream pipelines over value lists and tables

#[path = "testutils/mod.rs"]
mod testutils;

use docdb::stream::{
    expr_fn, field, filter, from_values, map, skip, take, Environment, Literal, Source, Step,
    Stream, Visit,
};
use docdb::{DatabaseError, Document, Value};
use std::cell::{Cell, RefCell};
use testutils::{doc_ab, DbFixture};

/// Emits `{a: x}` for each `x` and remembers the address of every
/// environment it hands out
struct RecordingSource {
    values: Vec<i64>,
    produced: RefCell<Vec<usize>>,
    reads: Cell<usize>,
}

impl RecordingSource {
    fn new(values: Vec<i64>) -> Self {
        Self {
            values,
            produced: RefCell::new(Vec::new()),
            reads: Cell::new(0),
        }
    }
}

impl Source for &RecordingSource {
    fn iterate(&self, visit: &mut Visit<'_>) -> docdb::Result<()> {
        for x in &self.values {
            self.reads.set(self.reads.get() + 1);
            let env = Environment::from_value(Value::Document(Document::new().add("a", *x)));
            self.produced
                .borrow_mut()
                .push(&env as *const Environment<'_> as usize);
            if visit(&env)? == Step::Stop {
                break;
            }
        }
        Ok(())
    }
}

#[test]
fn test_map_binds_current_value_and_keeps_outer() {
    testutils::init_logging();
    let source = RecordingSource::new(vec![3, 1, 4, 1, 5]);
    let stream = Stream::new(&source).pipe(map(field("a")));

    let mut results = Vec::new();
    let mut outers = Vec::new();
    stream
        .iterate(&mut |env| {
            results.push(env.current_value().cloned());
            let outer = env.outer().expect("map output must have an outer scope");
            outers.push(outer as *const Environment<'_> as usize);
            assert_eq!(
                outer.lookup(&"a".into()),
                env.current_value(),
                "outer scope is the input row"
            );
            Ok(Step::Continue)
        })
        .unwrap();

    let expected: Vec<Option<Value>> = [3, 1, 4, 1, 5]
        .iter()
        .map(|x| Some(Value::Integer(*x)))
        .collect();
    assert_eq!(results, expected);
    assert_eq!(outers, *source.produced.borrow());
}

#[test]
fn test_stop_consumes_partially() {
    let source = RecordingSource::new((0..10).collect());
    let stream = Stream::new(&source).pipe(map(field("a")));

    let mut seen = Vec::new();
    let res = stream.iterate(&mut |env| {
        seen.push(env.current_value().cloned().unwrap_or(Value::Null));
        Ok(if seen.len() == 4 { Step::Stop } else { Step::Continue })
    });

    assert!(res.is_ok());
    assert_eq!(seen.len(), 4);
    assert!(source.reads.get() < 10);
}

#[test]
fn test_take_stops_at_its_last_row() {
    let source = RecordingSource::new((0..10).collect());
    let stream = Stream::new(&source).pipe(take(3)).pipe(map(field("a")));

    assert_eq!(
        stream.collect_values().unwrap(),
        vec![Value::Integer(0), Value::Integer(1), Value::Integer(2)]
    );
    assert_eq!(source.reads.get(), 3);
}

#[test]
fn test_eval_error_aborts_pipeline() {
    let source = RecordingSource::new((0..10).collect());
    let stream = Stream::new(&source).pipe(map(expr_fn(|env| {
        match env.lookup(&"a".into()) {
            Some(Value::Integer(3)) => Err(DatabaseError::Eval("three".to_string())),
            Some(v) => Ok(v.clone()),
            None => Ok(Value::Null),
        }
    })));

    let mut visits = 0;
    let res = stream.iterate(&mut |_| {
        visits += 1;
        Ok(Step::Continue)
    });
    assert!(matches!(res, Err(DatabaseError::Eval(_))));
    assert_eq!(visits, 3);
    assert_eq!(source.reads.get(), 4);
}

#[test]
fn test_chained_operators() {
    let values = from_values((0..20).map(|i| Value::Document(doc_ab(i))));
    let stream = Stream::new(values)
        .pipe(filter(expr_fn(|env| {
            let even = matches!(env.lookup(&"a".into()), Some(Value::Integer(n)) if n % 2 == 0);
            Ok(Value::Bool(even))
        })))
        .pipe(skip(2))
        .pipe(take(3))
        .pipe(map(field("b")));

    assert_eq!(
        stream.collect_values().unwrap(),
        vec![Value::Integer(40), Value::Integer(60), Value::Integer(80)]
    );
}

#[test]
fn test_missing_field_maps_to_null() {
    let stream = Stream::new(from_values(vec![Value::Document(doc_ab(1))]))
        .pipe(map(field("missing")))
        .pipe(filter(Literal(Value::Bool(true))));

    assert_eq!(stream.collect_values().unwrap(), vec![Value::Null]);
}

#[test]
fn test_table_as_source() {
    let fixture = DbFixture::memory();
    let tx = fixture.write();
    tx.create_table("test", None).unwrap();
    let table = tx.get_table("test").unwrap();
    for i in 0..5 {
        table.insert(doc_ab(i)).unwrap();
    }

    let stream = Stream::new(table).pipe(map(field("b")));
    let values = stream.collect_values().unwrap();
    assert_eq!(
        values,
        (0..5).map(|i| Value::Integer(i * 10)).collect::<Vec<_>>()
    );
}
