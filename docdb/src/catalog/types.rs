// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog metadata records

use crate::document::{Path, ValueType};
use serde::{Deserialize, Serialize};

/// A rule attached to one field path of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    pub path: Path,
    /// `None` accepts any type
    pub value_type: Option<ValueType>,
    pub is_not_null: bool,
    pub is_primary_key: bool,
}

impl FieldConstraint {
    pub fn new(path: impl Into<Path>, value_type: ValueType) -> Self {
        Self {
            path: path.into(),
            value_type: Some(value_type),
            is_not_null: false,
            is_primary_key: false,
        }
    }

    pub fn untyped(path: impl Into<Path>) -> Self {
        Self {
            path: path.into(),
            value_type: None,
            is_not_null: false,
            is_primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

/// Schema of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub field_constraints: Vec<FieldConstraint>,
    pub(crate) store_id: u32,
}

impl TableInfo {
    pub fn new(field_constraints: Vec<FieldConstraint>) -> Self {
        Self {
            field_constraints,
            ..Default::default()
        }
    }

    pub fn primary_key(&self) -> Option<&FieldConstraint> {
        self.field_constraints.iter().find(|fc| fc.is_primary_key)
    }

    pub fn constraint_for(&self, path: &Path) -> Option<&FieldConstraint> {
        self.field_constraints.iter().find(|fc| &fc.path == path)
    }

    pub(crate) fn store_id(&self) -> u32 {
        self.store_id
    }
}

/// Definition of a secondary index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    pub index_name: String,
    pub table_name: String,
    pub path: Path,
    pub unique: bool,
    pub(crate) store_id: u32,
}

impl IndexConfig {
    pub fn new(
        index_name: impl Into<String>,
        table_name: impl Into<String>,
        path: impl Into<Path>,
    ) -> Self {
        Self {
            index_name: index_name.into(),
            table_name: table_name.into(),
            path: path.into(),
            unique: false,
            store_id: 0,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub(crate) fn store_id(&self) -> u32 {
        self.store_id
    }
}
