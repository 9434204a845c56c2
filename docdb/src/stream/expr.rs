// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Expression evaluation boundary
//!
//! Query-language expressions are opaque to the pipeline: anything that can
//! produce a [`Value`] from an [`Environment`] is an [`Expr`].

use super::environment::Environment;
use crate::document::{Path, Value};
use crate::error::Result;

pub trait Expr {
    fn eval(&self, env: &Environment<'_>) -> Result<Value>;
}

/// A missing field evaluates to `NULL`
impl Expr for Path {
    fn eval(&self, env: &Environment<'_>) -> Result<Value> {
        Ok(env.lookup(self).cloned().unwrap_or(Value::Null))
    }
}

/// A constant
#[derive(Debug, Clone, PartialEq)]
pub struct Literal(pub Value);

impl Expr for Literal {
    fn eval(&self, _env: &Environment<'_>) -> Result<Value> {
        Ok(self.0.clone())
    }
}

/// Expression backed by a closure, see [`expr_fn`]
pub struct FnExpr<F>(F);

impl<F> Expr for FnExpr<F>
where
    F: Fn(&Environment<'_>) -> Result<Value>,
{
    fn eval(&self, env: &Environment<'_>) -> Result<Value> {
        (self.0)(env)
    }
}

pub fn expr_fn<F>(f: F) -> FnExpr<F>
where
    F: Fn(&Environment<'_>) -> Result<Value>,
{
    FnExpr(f)
}

/// Parse a dotted field path into an expression
pub fn field(path: &str) -> Path {
    Path::parse(path)
}
