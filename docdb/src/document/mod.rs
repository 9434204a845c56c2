// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Document value model
//!
//! This module provides:
//! - The dynamically typed [`Value`] stored in documents
//! - [`Document`], an ordered field buffer
//! - [`Path`] for addressing nested fields
//! - The order-preserving binary codec used for keys and index entries

pub mod encoding;
pub mod path;

pub use encoding::{canonical_type_tag, decode, encode, encode_canonical, EncodingError};
pub use path::{Path, PathFragment};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Null,
    Bool,
    Integer,
    Double,
    Text,
    Blob,
    Array,
    Document,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::Text => "text",
            ValueType::Blob => "blob",
            ValueType::Array => "array",
            ValueType::Document => "document",
        };
        write!(f, "{}", name)
    }
}

/// A document field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Array(Vec<Value>),
    Document(Document),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Null,
            Value::Bool(_) => ValueType::Bool,
            Value::Integer(_) => ValueType::Integer,
            Value::Double(_) => ValueType::Double,
            Value::Text(_) => ValueType::Text,
            Value::Blob(_) => ValueType::Blob,
            Value::Array(_) => ValueType::Array,
            Value::Document(_) => ValueType::Document,
        }
    }

    /// Walk nested documents and arrays
    pub fn at(&self, fragments: &[PathFragment]) -> Option<&Value> {
        let mut current = self;
        for fragment in fragments {
            current = match (fragment, current) {
                (PathFragment::Field(name), Value::Document(doc)) => doc.get(name)?,
                (PathFragment::Index(i), Value::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Truthiness used by filtering operators: null, false, zero and empty
    /// values are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Double(f) => *f != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Blob(b) => !b.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Document(d) => !d.is_empty(),
        }
    }

    /// Convert to `target` following the insert coercion rules.
    ///
    /// Integers widen to doubles; doubles narrow to integers only when they
    /// are integral and in range. Null converts to anything.
    pub fn convert_to(&self, target: ValueType) -> Option<Value> {
        if self.value_type() == target || self.is_null() {
            return Some(self.clone());
        }
        match (self, target) {
            (Value::Integer(i), ValueType::Double) => Some(Value::Double(*i as f64)),
            (Value::Double(f), ValueType::Integer) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(Value::Integer(*f as i64))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Blob(b) => write!(f, "<blob {} bytes>", b.len()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Document(doc) => write!(f, "{}", doc),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Document> for Value {
    fn from(d: Document) -> Self {
        Value::Document(d)
    }
}

/// An ordered set of named fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn add(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Replace the field if it exists, append it otherwise
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Resolve a nested path
    pub fn get_path(&self, path: &Path) -> Option<&Value> {
        let (first, rest) = path.fragments().split_first()?;
        match first {
            PathFragment::Field(name) => self.get(name)?.at(rest),
            PathFragment::Index(_) => None,
        }
    }

    /// Overwrite the value at an existing path. Returns false when the path
    /// does not resolve.
    pub fn replace_path(&mut self, path: &Path, value: Value) -> bool {
        let Some((first, rest)) = path.fragments().split_first() else {
            return false;
        };
        let PathFragment::Field(name) = first else {
            return false;
        };
        let Some((_, slot)) = self.fields.iter_mut().find(|(n, _)| n == name) else {
            return false;
        };

        let mut current = slot;
        for fragment in rest {
            current = match (fragment, current) {
                (PathFragment::Field(name), Value::Document(doc)) => {
                    match doc.fields.iter_mut().find(|(n, _)| n == name) {
                        Some((_, v)) => v,
                        None => return false,
                    }
                }
                (PathFragment::Index(i), Value::Array(items)) => match items.get_mut(*i) {
                    Some(v) => v,
                    None => return false,
                },
                _ => return false,
            };
        }
        *current = value;
        true
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path_lookup_and_replace() {
        let mut doc = Document::new().add("a", 1i64).add(
            "b",
            Document::new().add("c", Value::Array(vec![Value::from("x"), Value::from("y")])),
        );

        assert_eq!(doc.get_path(&Path::parse("a")), Some(&Value::Integer(1)));
        assert_eq!(doc.get_path(&Path::parse("b.c.1")), Some(&Value::from("y")));
        assert_eq!(doc.get_path(&Path::parse("b.c.5")), None);
        assert_eq!(doc.get_path(&Path::parse("a.b")), None);

        assert!(doc.replace_path(&Path::parse("b.c.0"), Value::from("z")));
        assert_eq!(doc.get_path(&Path::parse("b.c.0")), Some(&Value::from("z")));
        assert!(!doc.replace_path(&Path::parse("missing"), Value::Null));
    }

    #[test]
    fn test_convert_to() {
        assert_eq!(
            Value::Integer(3).convert_to(ValueType::Double),
            Some(Value::Double(3.0))
        );
        assert_eq!(
            Value::Double(4.0).convert_to(ValueType::Integer),
            Some(Value::Integer(4))
        );
        assert_eq!(Value::Double(4.5).convert_to(ValueType::Integer), None);
        assert_eq!(Value::from("x").convert_to(ValueType::Integer), None);
        assert_eq!(Value::Null.convert_to(ValueType::Text), Some(Value::Null));
    }
}
