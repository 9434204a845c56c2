// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage engine
//!
//! Committed state is an immutable snapshot behind an `Arc`; every
//! transaction reads the snapshot current at `begin`, and commit publishes a
//! new snapshot with the overlay applied.

use super::overlay::{collect_range, WriteOverlay, WriterSlot};
use super::traits::{EngineTransaction, StorageEngine};
use super::types::{KvPair, StorageDriverError, StorageResult, StorageType};
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

type Snapshot = Arc<BTreeMap<Vec<u8>, Vec<u8>>>;

/// Memory engine implementation
#[derive(Default)]
pub struct MemoryEngine {
    committed: Arc<RwLock<Snapshot>>,
    writer: Arc<AtomicBool>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn EngineTransaction>> {
        let writer = if writable {
            Some(WriterSlot::acquire(&self.writer)?)
        } else {
            None
        };

        Ok(Box::new(MemoryTransaction {
            snapshot: self.committed.read().clone(),
            committed: self.committed.clone(),
            overlay: WriteOverlay::default(),
            writer,
        }))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

/// Transaction over a memory engine snapshot
pub struct MemoryTransaction {
    snapshot: Snapshot,
    committed: Arc<RwLock<Snapshot>>,
    overlay: WriteOverlay,
    writer: Option<WriterSlot>,
}

impl EngineTransaction for MemoryTransaction {
    fn writable(&self) -> bool {
        self.writer.is_some()
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        if let Some(pending) = self.overlay.get(key) {
            return Ok(pending.map(<[u8]>::to_vec));
        }
        Ok(self.snapshot.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        if !self.writable() {
            return Err(StorageDriverError::ReadOnly);
        }
        self.overlay.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        if !self.writable() {
            return Err(StorageDriverError::ReadOnly);
        }
        self.overlay.delete(key);
        Ok(())
    }

    fn scan(&self, start: &[u8], prefix: &[u8]) -> StorageResult<Vec<KvPair>> {
        let base = collect_range(self.snapshot.range(start.to_vec()..), prefix);
        Ok(self.overlay.merge_scan(base, start, prefix))
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        let MemoryTransaction {
            committed,
            overlay,
            writer,
            ..
        } = *self;

        if writer.is_none() || overlay.is_empty() {
            return Ok(());
        }

        let mut guard = committed.write();
        let mut next = guard.as_ref().clone();
        for (key, value) in overlay.into_writes() {
            match value {
                Some(v) => {
                    next.insert(key, v);
                }
                None => {
                    next.remove(&key);
                }
            }
        }
        debug!("Memory engine committed snapshot with {} keys", next.len());
        *guard = Arc::new(next);
        Ok(())
    }

    fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}
