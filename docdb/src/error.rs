// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for DocDB

use crate::document::{EncodingError, ValueType};
use crate::storage::StorageDriverError;
use thiserror::Error;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Empty names, or names using the reserved system prefix
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[from] ConstraintViolation),

    /// A unique index already maps the value to another document
    #[error("Duplicate value in unique index {0}")]
    DuplicateIndexValue(String),

    #[error("Document not found")]
    DocumentNotFound,

    /// A mutation was attempted through a read-only transaction
    #[error("Transaction is read-only")]
    ReadOnly,

    /// The engine transaction is gone. `commit` and `rollback` consume the
    /// transaction, so this only guards the internal engine accessors.
    #[error("Transaction is closed")]
    TransactionClosed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageDriverError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Expression evaluation failure inside a stream operator
    #[error("Evaluation error: {0}")]
    Eval(String),
}

impl From<bincode::Error> for DatabaseError {
    fn from(e: bincode::Error) -> Self {
        DatabaseError::Storage(StorageDriverError::from(e))
    }
}

/// Schema constraint failures raised by inserts and schema changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstraintViolation {
    #[error("field {path} must not be null")]
    NotNull { path: String },

    #[error("field {path} expects {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("duplicate primary key")]
    DuplicatePrimaryKey,

    #[error("primary key of the replacement document does not match its key")]
    PrimaryKeyMismatch,

    #[error("a constraint already exists for field {path}")]
    DuplicateField { path: String },

    #[error("table {table} already has a primary key")]
    MultiplePrimaryKeys { table: String },
}
