// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Lazy, composable evaluation pipeline
//!
//! A [`Source`] pushes environments into a visitor. A [`Stream`] wraps a
//! source and at most one [`Operator`]; since a stream is itself a source,
//! pipelines are built by chaining [`Stream::pipe`] calls.
//!
//! Visitors answer every element with a [`Step`] or an error. `Step::Stop`
//! ends iteration early and is reported to the caller as success.

pub mod environment;
pub mod expr;
pub mod operators;

pub use environment::Environment;
pub use expr::{expr_fn, field, Expr, FnExpr, Literal};
pub use operators::{filter, map, skip, take, Emit, Filter, Map, Operator, OperatorStep, Skip, Take};

use crate::document::Value;
use crate::error::Result;

/// Outcome of visiting one element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Stop,
}

/// Visitor invoked once per produced environment
pub type Visit<'v> = dyn FnMut(&Environment<'_>) -> Result<Step> + 'v;

/// Anything that can drive a visitor over environments
pub trait Source {
    /// Call `visit` for every element until the source is exhausted, the
    /// visitor answers `Step::Stop`, or it fails.
    fn iterate(&self, visit: &mut Visit<'_>) -> Result<()>;
}

/// A source with an optional operator applied to each element
#[derive(Default)]
pub struct Stream<'s> {
    source: Option<Box<dyn Source + 's>>,
    op: Option<Box<dyn Operator + 's>>,
}

impl<'s> Stream<'s> {
    /// A stream that delegates to `source`
    pub fn new(source: impl Source + 's) -> Self {
        Self {
            source: Some(Box::new(source)),
            op: None,
        }
    }

    /// A stream that produces nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read from this stream and apply `op` to every element
    pub fn pipe(self, op: impl Operator + 's) -> Stream<'s> {
        Stream {
            source: Some(Box::new(self)),
            op: Some(Box::new(op)),
        }
    }

    /// Drain the stream, cloning every current value
    pub fn collect_values(&self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        self.iterate(&mut |env| {
            values.push(env.current_value().cloned().unwrap_or(Value::Null));
            Ok(Step::Continue)
        })?;
        Ok(values)
    }
}

impl Source for Stream<'_> {
    fn iterate(&self, visit: &mut Visit<'_>) -> Result<()> {
        let Some(source) = &self.source else {
            return Ok(());
        };
        let Some(op) = &self.op else {
            return source.iterate(visit);
        };

        // Fresh per-call state: a stream can be iterated any number of times.
        let mut step = op.start();
        source.iterate(&mut |env| match step.apply(env)? {
            Emit::Row(out) => visit(&out),
            Emit::Pass => visit(env),
            Emit::PassLast => {
                visit(env)?;
                Ok(Step::Stop)
            }
            Emit::Skip => Ok(Step::Continue),
            Emit::Stop => Ok(Step::Stop),
        })
    }
}

/// Source over a fixed list of values, each bound as the current value of a
/// fresh root environment
#[derive(Debug, Clone, Default)]
pub struct Values(Vec<Value>);

impl Source for Values {
    fn iterate(&self, visit: &mut Visit<'_>) -> Result<()> {
        for value in &self.0 {
            let env = Environment::from_value(value.clone());
            if visit(&env)? == Step::Stop {
                break;
            }
        }
        Ok(())
    }
}

pub fn from_values(values: impl IntoIterator<Item = Value>) -> Values {
    Values(values.into_iter().collect())
}
