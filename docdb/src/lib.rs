// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! DocDB - an embedded document database
//!
//! Documents are stored in tables over a pluggable key-value engine
//! (in-memory, sled or redb). Tables may declare typed, not-null and
//! primary-key field constraints and carry secondary indexes, unique or
//! not. All access goes through transactions; a single read-write
//! transaction may be open at a time.
//!
//! Query results flow through [`stream`], a lazy pipeline of operators over
//! nested evaluation environments.
//!
//! ```ignore
//! use docdb::{Database, Document, IndexConfig};
//!
//! let db = Database::memory();
//! db.update(|tx| {
//!     tx.create_table("users", None)?;
//!     tx.create_index(IndexConfig::new("idx_users_age", "users", "age"))?;
//!     tx.get_table("users")?.insert(Document::new().add("age", 42i64))?;
//!     Ok(())
//! })?;
//! ```

pub mod catalog;
pub mod database;
pub mod document;
pub mod error;
pub mod storage;
pub mod stream;

pub use catalog::{FieldConstraint, IndexConfig, TableInfo};
pub use database::{Database, DatabaseOptions, Index, Pivot, Table, Transaction};
pub use document::{Document, Path, Value, ValueType};
pub use error::{ConstraintViolation, DatabaseError, Result};
pub use storage::StorageType;
pub use stream::{Environment, Source, Step, Stream};
