// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Database handle and transactional API
//!
//! This module provides:
//! - [`Database`], which owns a storage engine and opens transactions
//! - [`Transaction`], exposing every schema and index operation
//! - [`Table`] and [`Index`] handles borrowed from a transaction

pub mod index;
pub(crate) mod keys;
pub mod options;
pub mod table;
pub mod transaction;

pub use index::{Index, Pivot};
pub use options::{DatabaseOptions, DEFAULT_RESERVED_PREFIX};
pub use table::Table;
pub use transaction::Transaction;

use crate::error::Result;
use crate::storage::StorageEngine;
use log::info;
use std::sync::Arc;

/// An open database
pub struct Database {
    engine: Arc<dyn StorageEngine>,
    options: DatabaseOptions,
}

impl Database {
    /// Open a database with the engine described by `options`
    pub fn open(options: DatabaseOptions) -> Result<Self> {
        let engine = options.open_engine()?;
        info!(
            "Opened {} database{}",
            engine.storage_type(),
            options
                .path
                .as_ref()
                .map(|p| format!(" at {}", p.display()))
                .unwrap_or_default()
        );
        Ok(Self { engine, options })
    }

    /// Open a database over an existing engine
    pub fn with_engine(engine: Arc<dyn StorageEngine>, options: DatabaseOptions) -> Self {
        Self { engine, options }
    }

    /// A fresh in-memory database
    pub fn memory() -> Self {
        Self::with_engine(
            Arc::new(crate::storage::MemoryEngine::new()),
            DatabaseOptions::memory(),
        )
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Start a transaction. Only one writable transaction may be open at a time.
    pub fn begin(&self, writable: bool) -> Result<Transaction> {
        Transaction::begin(self.engine.as_ref(), writable, &self.options.reserved_prefix)
    }

    /// Run `f` in a read-only transaction
    pub fn view<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let tx = self.begin(false)?;
        let result = f(&tx);
        tx.rollback()?;
        result
    }

    /// Run `f` in a read-write transaction, committing on success and
    /// rolling back on error
    pub fn update<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let tx = self.begin(true)?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                tx.rollback()?;
                Err(e)
            }
        }
    }

    /// Flush committed data to durable storage
    pub fn flush(&self) -> Result<()> {
        self.engine.flush()?;
        Ok(())
    }
}
