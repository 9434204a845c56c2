// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage engine implementation

use super::overlay::{WriteOverlay, WriterSlot};
use super::traits::{EngineTransaction, StorageEngine};
use super::types::{KvPair, StorageDriverError, StorageResult, StorageType};
use log::debug;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const DATA_TREE: &str = "docdb_data";

fn sled_err(e: sled::Error) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

/// Sled engine implementation
///
/// All data lives in one sled tree; a commit is a single atomic batch.
pub struct SledEngine {
    db: sled::Db,
    tree: sled::Tree,
    writer: Arc<AtomicBool>,
}

impl SledEngine {
    /// Open (or create) a sled database in the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path.as_ref()).map_err(sled_err)?;
        Self::from_db(db)
    }

    /// Open a throwaway sled database removed on drop
    pub fn temporary() -> StorageResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(sled_err)?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StorageResult<Self> {
        let tree = db.open_tree(DATA_TREE).map_err(sled_err)?;
        Ok(Self {
            db,
            tree,
            writer: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl StorageEngine for SledEngine {
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn EngineTransaction>> {
        let writer = if writable {
            Some(WriterSlot::acquire(&self.writer)?)
        } else {
            None
        };

        Ok(Box::new(SledTransaction {
            tree: self.tree.clone(),
            overlay: WriteOverlay::default(),
            writer,
        }))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush().map_err(sled_err)?;
        Ok(())
    }
}

/// Sled transaction: reads go to the tree, writes are staged until commit
pub struct SledTransaction {
    tree: sled::Tree,
    overlay: WriteOverlay,
    writer: Option<WriterSlot>,
}

impl EngineTransaction for SledTransaction {
    fn writable(&self) -> bool {
        self.writer.is_some()
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        if let Some(pending) = self.overlay.get(key) {
            return Ok(pending.map(<[u8]>::to_vec));
        }
        let value = self.tree.get(key).map_err(sled_err)?;
        Ok(value.map(|v| v.to_vec()))
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
        let mut base = Vec::new();
        for item in self.tree.range(start..) {
            let (k, v) = item.map_err(sled_err)?;
            if !k.starts_with(prefix) {
                break;
            }
            base.push((k.to_vec(), v.to_vec()));
        }
        Ok(self.overlay.merge_scan(base, start, prefix))
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        let SledTransaction {
            tree,
            overlay,
            writer,
        } = *self;

        if writer.is_none() || overlay.is_empty() {
            return Ok(());
        }

        let mut batch = sled::Batch::default();
        let mut count = 0usize;
        for (key, value) in overlay.into_writes() {
            match value {
                Some(v) => batch.insert(key, v),
                None => batch.remove(key),
            }
            count += 1;
        }
        tree.apply_batch(batch).map_err(sled_err)?;
        tree.flush().map_err(sled_err)?;
        debug!("Sled engine committed batch of {} writes", count);
        Ok(())
    }

    fn rollback(self: Box<Self>) -> StorageResult<()> {
        Ok(())
    }
}
