// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Stream operators
//!
//! An [`Operator`] is a reusable description; [`Operator::start`] builds the
//! mutable per-iteration state ([`OperatorStep`]) each time a stream is
//! iterated.

use super::environment::Environment;
use super::expr::Expr;
use crate::error::Result;

/// What an operator step produces for one input environment
pub enum Emit<'e> {
    /// A new environment, usually nested in the input one
    Row(Environment<'e>),
    /// Forward the input environment unchanged
    Pass,
    /// Forward the input environment, then end the iteration
    PassLast,
    /// Drop this element and keep going
    Skip,
    /// End the iteration successfully
    Stop,
}

pub trait Operator {
    /// Called once per `iterate`
    fn start(&self) -> Box<dyn OperatorStep + '_>;
}

pub trait OperatorStep {
    fn apply<'e>(&mut self, env: &'e Environment<'e>) -> Result<Emit<'e>>;
}

/// Evaluates an expression and binds the result as the current value of a
/// scope nested in the input.
pub struct Map {
    expr: Box<dyn Expr>,
}

pub fn map(expr: impl Expr + 'static) -> Map {
    Map {
        expr: Box::new(expr),
    }
}

struct MapStep<'o> {
    expr: &'o dyn Expr,
}

impl Operator for Map {
    fn start(&self) -> Box<dyn OperatorStep + '_> {
        Box::new(MapStep {
            expr: self.expr.as_ref(),
        })
    }
}

impl OperatorStep for MapStep<'_> {
    fn apply<'e>(&mut self, env: &'e Environment<'e>) -> Result<Emit<'e>> {
        let value = self.expr.eval(env)?;
        // A fresh scope per element: the visitor may still borrow the previous one.
        let mut out = Environment::with_outer(env);
        out.set_current_value(value);
        Ok(Emit::Row(out))
    }
}

/// Keeps the elements for which the expression is truthy
pub struct Filter {
    expr: Box<dyn Expr>,
}

pub fn filter(expr: impl Expr + 'static) -> Filter {
    Filter {
        expr: Box::new(expr),
    }
}

struct FilterStep<'o> {
    expr: &'o dyn Expr,
}

impl Operator for Filter {
    fn start(&self) -> Box<dyn OperatorStep + '_> {
        Box::new(FilterStep {
            expr: self.expr.as_ref(),
        })
    }
}

impl OperatorStep for FilterStep<'_> {
    fn apply<'e>(&mut self, env: &'e Environment<'e>) -> Result<Emit<'e>> {
        if self.expr.eval(env)?.is_truthy() {
            Ok(Emit::Pass)
        } else {
            Ok(Emit::Skip)
        }
    }
}

/// Passes the first `n` elements, then stops the source
#[derive(Debug, Clone, Copy)]
pub struct Take {
    n: usize,
}

pub fn take(n: usize) -> Take {
    Take { n }
}

struct TakeStep {
    remaining: usize,
}

impl Operator for Take {
    fn start(&self) -> Box<dyn OperatorStep + '_> {
        Box::new(TakeStep { remaining: self.n })
    }
}

impl OperatorStep for TakeStep {
    fn apply<'e>(&mut self, _env: &'e Environment<'e>) -> Result<Emit<'e>> {
        if self.remaining == 0 {
            return Ok(Emit::Stop);
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Ok(Emit::PassLast)
        } else {
            Ok(Emit::Pass)
        }
    }
}

/// Drops the first `n` elements
#[derive(Debug, Clone, Copy)]
pub struct Skip {
    n: usize,
}

pub fn skip(n: usize) -> Skip {
    Skip { n }
}

struct SkipStep {
    remaining: usize,
}

impl Operator for Skip {
    fn start(&self) -> Box<dyn OperatorStep + '_> {
        Box::new(SkipStep { remaining: self.n })
    }
}

impl OperatorStep for SkipStep {
    fn apply<'e>(&mut self, _env: &'e Environment<'e>) -> Result<Emit<'e>> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(Emit::Skip);
        }
        Ok(Emit::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{expr_fn, field, from_values, Literal, Source, Step, Stream};
    use super::*;
    use crate::document::{Document, Value};
    use crate::error::DatabaseError;

    fn rows() -> Stream<'static> {
        Stream::new(from_values((0..6i64).map(|i| {
            Value::Document(Document::new().add("a", i).add("even", i % 2 == 0))
        })))
    }

    #[test]
    fn test_filter_skip_take_chain() {
        let stream = rows()
            .pipe(filter(field("even")))
            .pipe(skip(1))
            .pipe(take(1))
            .pipe(map(field("a")));
        assert_eq!(stream.collect_values().unwrap(), vec![Value::Integer(2)]);
    }

    #[test]
    fn test_take_zero_yields_nothing() {
        let stream = rows().pipe(take(0));
        assert!(stream.collect_values().unwrap().is_empty());
    }

    #[test]
    fn test_map_literal_and_missing_field() {
        let stream = rows().pipe(take(1)).pipe(map(Literal(Value::from("x"))));
        assert_eq!(stream.collect_values().unwrap(), vec![Value::from("x")]);

        let stream = rows().pipe(take(1)).pipe(map(field("nope")));
        assert_eq!(stream.collect_values().unwrap(), vec![Value::Null]);
    }

    #[test]
    fn test_eval_error_aborts_pipeline() {
        let stream = rows().pipe(map(expr_fn(|_env| {
            Err(DatabaseError::Eval("division by zero".to_string()))
        })));
        let mut visited = 0;
        let res = stream.iterate(&mut |_env| {
            visited += 1;
            Ok(Step::Continue)
        });
        assert!(matches!(res, Err(DatabaseError::Eval(_))));
        assert_eq!(visited, 0);
    }
}
