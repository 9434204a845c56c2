// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Shared fixtures for integration tests

#![allow(dead_code)]

use docdb::{Database, DatabaseOptions, Document, StorageType, Transaction};
use std::path::PathBuf;
use tempfile::TempDir;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A database plus whatever backing directory it needs
pub struct DbFixture {
    pub db: Database,
    options: DatabaseOptions,
    _dir: Option<TempDir>,
}

impl DbFixture {
    pub fn memory() -> Self {
        init_logging();
        Self {
            db: Database::memory(),
            options: DatabaseOptions::memory(),
            _dir: None,
        }
    }

    pub fn on_disk(storage_type: StorageType) -> Self {
        init_logging();
        let dir = TempDir::new().expect("Failed to create temp dir");
        let options = DatabaseOptions::on_disk(storage_type, dir.path().to_path_buf());
        let db = Database::open(options.clone()).expect("Failed to open database");
        Self {
            db,
            options,
            _dir: Some(dir),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.options.path.clone()
    }

    /// Close the database and open it again from the same directory
    pub fn reopen(self) -> Self {
        let Self { db, options, _dir } = self;
        drop(db);
        let db = Database::open(options.clone()).expect("Failed to reopen database");
        Self { db, options, _dir }
    }

    pub fn write(&self) -> Transaction {
        self.db.begin(true).expect("Failed to begin write transaction")
    }

    pub fn read(&self) -> Transaction {
        self.db.begin(false).expect("Failed to begin read transaction")
    }
}

/// `{a: n, b: 10 * n}`
pub fn doc_ab(n: i64) -> Document {
    Document::new().add("a", n).add("b", n * 10)
}
