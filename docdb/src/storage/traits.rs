// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage engine boundary
//!
//! The database core only needs an ordered, transactional byte keyspace.
//! Every backend implements [`StorageEngine`] and hands out
//! [`EngineTransaction`] handles; nothing above this module knows which
//! backend is in use.

use super::types::{KvPair, StorageResult, StorageType};

/// A transactional ordered key-value store
pub trait StorageEngine: Send + Sync {
    /// Open a transaction. Only one writable transaction may be open at a time.
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn EngineTransaction>>;

    /// Backend identifier
    fn storage_type(&self) -> StorageType;

    /// Force committed data to durable storage
    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// A unit of work against a [`StorageEngine`]
///
/// Dropping a transaction without calling `commit` discards its writes.
pub trait EngineTransaction {
    /// Whether writes are allowed
    fn writable(&self) -> bool;

    /// Read a single key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Insert or overwrite a key
    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Remove a key; removing an absent key is not an error
    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Ascending scan starting at the first key >= `start`, stopping at the
    /// first key that does not begin with `prefix`.
    fn scan(&self, start: &[u8], prefix: &[u8]) -> StorageResult<Vec<KvPair>>;

    /// Make every write of this transaction visible atomically
    fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Discard every write of this transaction
    fn rollback(self: Box<Self>) -> StorageResult<()>;
}

/// Scan helper: all pairs whose key starts with `prefix`
pub fn scan_prefix(tx: &dyn EngineTransaction, prefix: &[u8]) -> StorageResult<Vec<KvPair>> {
    tx.scan(prefix, prefix)
}
