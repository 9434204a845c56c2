// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Chained variable scopes

use crate::document::{Path, PathFragment, Value};

/// One scope of an evaluation chain.
///
/// A scope holds an optional current value and named variables, and borrows
/// (never owns) the scope it was derived from. Lookups walk outward.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    current: Option<Value>,
    vars: Vec<(String, Value)>,
    outer: Option<&'a Environment<'a>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Self {
            current: None,
            vars: Vec::new(),
            outer: None,
        }
    }

    /// A root scope whose current value is `value`
    pub fn from_value(value: Value) -> Self {
        Self {
            current: Some(value),
            vars: Vec::new(),
            outer: None,
        }
    }

    /// An empty scope nested inside `outer`
    pub fn with_outer(outer: &'a Environment<'a>) -> Self {
        Self {
            current: None,
            vars: Vec::new(),
            outer: Some(outer),
        }
    }

    pub fn outer(&self) -> Option<&'a Environment<'a>> {
        self.outer
    }

    pub fn set_current_value(&mut self, value: Value) {
        self.current = Some(value);
    }

    /// Current value of the nearest scope that has one
    pub fn current_value(&self) -> Option<&Value> {
        let mut env: Option<&Environment<'a>> = Some(self);
        while let Some(e) = env {
            if let Some(value) = &e.current {
                return Some(value);
            }
            env = e.outer;
        }
        None
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.vars.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.vars.push((name, value)),
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&Value> {
        let mut env: Option<&Environment<'a>> = Some(self);
        while let Some(e) = env {
            if let Some((_, value)) = e.vars.iter().find(|(n, _)| n == name) {
                return Some(value);
            }
            env = e.outer;
        }
        None
    }

    /// Resolve a path against the chain: in each scope the current document
    /// is tried first, then the variables; the first hit wins.
    pub fn lookup(&self, path: &Path) -> Option<&Value> {
        let mut env: Option<&Environment<'a>> = Some(self);
        while let Some(e) = env {
            if let Some(value) = e.lookup_local(path) {
                return Some(value);
            }
            env = e.outer;
        }
        None
    }

    fn lookup_local(&self, path: &Path) -> Option<&Value> {
        if let Some(Value::Document(doc)) = &self.current {
            if let Some(value) = doc.get_path(path) {
                return Some(value);
            }
        }
        let (first, rest) = path.fragments().split_first()?;
        let PathFragment::Field(name) = first else {
            return None;
        };
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, value)| value.at(rest))
    }
}
