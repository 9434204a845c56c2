// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Field paths such as `address.city` or `tags.0`

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathFragment {
    Field(String),
    Index(usize),
}

/// A dotted path into a document; numeric segments address array elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(Vec<PathFragment>);

impl Path {
    pub fn new(fragments: Vec<PathFragment>) -> Self {
        Self(fragments)
    }

    pub fn parse(s: &str) -> Self {
        let fragments = s
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.parse::<usize>() {
                Ok(i) => PathFragment::Index(i),
                Err(_) => PathFragment::Field(segment.to_string()),
            })
            .collect();
        Self(fragments)
    }

    pub fn fragments(&self) -> &[PathFragment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fragment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match fragment {
                PathFragment::Field(name) => write!(f, "{}", name)?,
                PathFragment::Index(idx) => write!(f, "{}", idx)?,
            }
        }
        Ok(())
    }
}
