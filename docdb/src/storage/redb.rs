// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! REDB storage engine implementation
//!
//! REDB has real transactions, so no overlay is needed: a docdb transaction
//! wraps one redb read or write transaction.

use super::overlay::WriterSlot;
use super::traits::{EngineTransaction, StorageEngine};
use super::types::{KvPair, StorageDriverError, StorageResult, StorageType};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

const DATA_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("docdb_data");

fn redb_err<E: std::fmt::Display>(e: E) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

/// REDB engine implementation
pub struct RedbEngine {
    db: Arc<Database>,
    writer: Arc<AtomicBool>,
}

impl RedbEngine {
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        // REDB requires a file path, not a directory
        let db_path = if path.as_ref().is_dir() {
            path.as_ref().join("docdb.redb")
        } else {
            path.as_ref().to_path_buf()
        };

        let db = Database::create(&db_path).map_err(redb_err)?;

        // Make sure the data table exists so read transactions can open it
        let write_txn = db.begin_write().map_err(redb_err)?;
        {
            let _ = write_txn.open_table(DATA_TABLE).map_err(redb_err)?;
        }
        write_txn.commit().map_err(redb_err)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl StorageEngine for RedbEngine {
    fn begin(&self, writable: bool) -> StorageResult<Box<dyn EngineTransaction>> {
        let txn = if writable {
            let slot = WriterSlot::acquire(&self.writer)?;
            let txn = self.db.begin_write().map_err(redb_err)?;
            RedbTransaction {
                txn: RedbTxn::Write(txn),
                _writer: Some(slot),
            }
        } else {
            RedbTransaction {
                txn: RedbTxn::Read(self.db.begin_read().map_err(redb_err)?),
                _writer: None,
            }
        };
        Ok(Box::new(txn))
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Redb
    }
}

enum RedbTxn {
    Read(redb::ReadTransaction),
    Write(redb::WriteTransaction),
}

/// REDB transaction wrapper
pub struct RedbTransaction {
    txn: RedbTxn,
    _writer: Option<WriterSlot>,
}

fn collect_range<T: ReadableTable<&'static [u8], &'static [u8]>>(
    table: &T,
    start: &[u8],
    prefix: &[u8],
) -> StorageResult<Vec<KvPair>> {
    let mut items = Vec::new();
    for item in table.range(start..).map_err(redb_err)? {
        let (k, v) = item.map_err(redb_err)?;
        if !k.value().starts_with(prefix) {
            break;
        }
        items.push((k.value().to_vec(), v.value().to_vec()));
    }
    Ok(items)
}

impl EngineTransaction for RedbTransaction {
    fn writable(&self) -> bool {
        matches!(self.txn, RedbTxn::Write(_))
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let value = match &self.txn {
            RedbTxn::Read(txn) => {
                let table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
                let result = table.get(key).map_err(redb_err)?;
                result.map(|guard| guard.value().to_vec())
            }
            RedbTxn::Write(txn) => {
                let table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
                let result = table.get(key).map_err(redb_err)?;
                result.map(|guard| guard.value().to_vec())
            }
        };
        Ok(value)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        let RedbTxn::Write(txn) = &self.txn else {
            return Err(StorageDriverError::ReadOnly);
        };
        let mut table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
        table.insert(key, value).map_err(redb_err)?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        let RedbTxn::Write(txn) = &self.txn else {
            return Err(StorageDriverError::ReadOnly);
        };
        let mut table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
        table.remove(key).map_err(redb_err)?;
        Ok(())
    }

    fn scan(&self, start: &[u8], prefix: &[u8]) -> StorageResult<Vec<KvPair>> {
        match &self.txn {
            RedbTxn::Read(txn) => {
                let table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
                collect_range(&table, start, prefix)
            }
            RedbTxn::Write(txn) => {
                let table = txn.open_table(DATA_TABLE).map_err(redb_err)?;
                collect_range(&table, start, prefix)
            }
        }
    }

    fn commit(self: Box<Self>) -> StorageResult<()> {
        match self.txn {
            RedbTxn::Write(txn) => txn.commit().map_err(redb_err),
            RedbTxn::Read(_) => Ok(()),
        }
    }

    fn rollback(self: Box<Self>) -> StorageResult<()> {
        match self.txn {
            RedbTxn::Write(txn) => txn.abort().map_err(redb_err),
            RedbTxn::Read(_) => Ok(()),
        }
    }
}
