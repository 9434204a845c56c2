// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Transactions
//!
//! A [`Transaction`] owns one storage engine transaction and one catalog
//! view. Handles obtained from it ([`Table`], [`Index`]) borrow it, so they
//! cannot outlive `commit` or `rollback`.
//!
//! Every operation is atomic on its own: it validates first and only then
//! writes. A failed operation does not abort the transaction.

use super::index::Index;
use super::keys;
use super::table::Table;
use crate::catalog::{Catalog, FieldConstraint, IndexConfig, TableInfo};
use crate::error::{DatabaseError, Result};
use crate::storage::{scan_prefix, EngineTransaction, StorageEngine};
use log::{debug, info, warn};
use std::cell::{Ref, RefCell, RefMut};

pub struct Transaction {
    engine: RefCell<Option<Box<dyn EngineTransaction>>>,
    catalog: RefCell<Catalog>,
    writable: bool,
}

/// Delete every key under `prefix`, returning how many were removed
pub(crate) fn clear_prefix(engine: &mut dyn EngineTransaction, prefix: &[u8]) -> Result<usize> {
    let entries = scan_prefix(engine, prefix)?;
    for (key, _) in &entries {
        engine.delete(key)?;
    }
    Ok(entries.len())
}

impl Transaction {
    pub(crate) fn begin(
        engine: &dyn StorageEngine,
        writable: bool,
        reserved_prefix: &str,
    ) -> Result<Self> {
        let tx = engine.begin(writable)?;
        let catalog = Catalog::load(&*tx, reserved_prefix)?;
        debug!(
            "Began {} transaction on {} engine",
            if writable { "read-write" } else { "read-only" },
            engine.storage_type()
        );

        Ok(Self {
            engine: RefCell::new(Some(tx)),
            catalog: RefCell::new(catalog),
            writable,
        })
    }

    pub fn writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn ensure_writable(&self) -> Result<()> {
        if self.writable {
            Ok(())
        } else {
            Err(DatabaseError::ReadOnly)
        }
    }

    pub(crate) fn engine(&self) -> Result<RefMut<'_, dyn EngineTransaction + 'static>> {
        RefMut::filter_map(self.engine.borrow_mut(), |tx| tx.as_deref_mut())
            .map_err(|_| DatabaseError::TransactionClosed)
    }

    pub(crate) fn engine_ref(&self) -> Result<Ref<'_, dyn EngineTransaction + 'static>> {
        Ref::filter_map(self.engine.borrow(), |tx| tx.as_deref())
            .map_err(|_| DatabaseError::TransactionClosed)
    }

    pub(crate) fn table_info(&self, name: &str) -> Result<TableInfo> {
        Ok(self.catalog.borrow().get_table(name)?.clone())
    }

    pub(crate) fn indexes_for_table(&self, name: &str) -> Vec<IndexConfig> {
        self.catalog.borrow().indexes_for_table(name)
    }

    /// Create a table. `info` may carry field constraints; its name is ignored.
    pub fn create_table(&self, name: &str, info: Option<TableInfo>) -> Result<()> {
        self.ensure_writable()?;
        let mut engine = self.engine()?;
        self.catalog
            .borrow_mut()
            .create_table(&mut *engine, name, info)?;
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Result<Table<'_>> {
        self.catalog.borrow().get_table(name)?;
        Ok(Table::new(self, name))
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.borrow().list_tables()
    }

    /// Drop a table, its documents and every index defined on it
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let info = self.table_info(name)?;
        let indexes = self.indexes_for_table(name);

        let mut engine = self.engine()?;
        let removed = clear_prefix(&mut *engine, &keys::table_prefix(info.store_id()))?;
        engine.delete(&keys::sequence(info.store_id()))?;
        for config in &indexes {
            clear_prefix(&mut *engine, &keys::index_prefix(config.store_id()))?;
        }
        self.catalog.borrow_mut().drop_table(&mut *engine, name)?;

        debug!("Removed {} document(s) of table '{}'", removed, name);
        Ok(())
    }

    /// Rename a table; indexes follow, their data is untouched
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.ensure_writable()?;
        let mut engine = self.engine()?;
        self.catalog
            .borrow_mut()
            .rename_table(&mut *engine, old_name, new_name)
    }

    /// Append a field constraint to a table
    pub fn add_field(&self, table_name: &str, constraint: FieldConstraint) -> Result<()> {
        self.ensure_writable()?;
        let mut engine = self.engine()?;
        self.catalog
            .borrow_mut()
            .add_field(&mut *engine, table_name, constraint)
    }

    /// Register an index. The index starts empty; see [`Transaction::reindex`].
    pub fn create_index(&self, config: IndexConfig) -> Result<()> {
        self.ensure_writable()?;
        let mut engine = self.engine()?;
        self.catalog.borrow_mut().create_index(&mut *engine, config)?;
        Ok(())
    }

    pub fn drop_index(&self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let config = self.catalog.borrow().get_index(name)?.clone();

        let mut engine = self.engine()?;
        clear_prefix(&mut *engine, &keys::index_prefix(config.store_id()))?;
        self.catalog.borrow_mut().drop_index(&mut *engine, name)?;
        Ok(())
    }

    pub fn get_index(&self, name: &str) -> Result<Index<'_>> {
        let config = self.catalog.borrow().get_index(name)?.clone();
        Ok(Index::new(self, config))
    }

    pub fn list_indexes(&self) -> Vec<IndexConfig> {
        self.catalog.borrow().list_indexes()
    }

    /// Rebuild an index from a full scan of its table.
    ///
    /// Documents without a value at the indexed path are skipped.
    pub fn reindex(&self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        let index = self.get_index(name)?;
        let table = self.get_table(&index.config().table_name)?;

        let path = index.config().path.clone();
        let mut entries = Vec::new();
        table.iterate_documents(|key, doc| {
            if let Some(value) = doc.get_path(&path) {
                entries.push((value.clone(), key.to_vec()));
            }
            Ok(crate::stream::Step::Continue)
        })?;

        let count = index.rebuild(entries)?;
        info!(
            "Reindexed '{}' from table '{}': {} entries",
            name,
            table.name(),
            count
        );
        Ok(())
    }

    /// Rebuild every index
    pub fn reindex_all(&self) -> Result<()> {
        for config in self.list_indexes() {
            self.reindex(&config.index_name)?;
        }
        Ok(())
    }

    pub fn commit(mut self) -> Result<()> {
        let tx = self
            .engine
            .get_mut()
            .take()
            .ok_or(DatabaseError::TransactionClosed)?;
        tx.commit()?;
        debug!("Committed transaction");
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        let tx = self
            .engine
            .get_mut()
            .take()
            .ok_or(DatabaseError::TransactionClosed)?;
        tx.rollback()?;
        debug!("Rolled back transaction");
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let Some(tx) = self.engine.get_mut().take() else {
            return;
        };
        if self.writable {
            warn!("Read-write transaction dropped without commit or rollback; rolling back");
        }
        if let Err(e) = tx.rollback() {
            warn!("Rollback on drop failed: {}", e);
        }
    }
}
