// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table and index catalog
//!
//! The catalog is loaded in full when a transaction begins and every
//! mutation is written through to the transaction's storage, so it becomes
//! durable on commit and vanishes on rollback. Each operation validates
//! before it writes anything.

pub mod types;

pub use types::{FieldConstraint, IndexConfig, TableInfo};

use crate::database::keys;
use crate::error::{ConstraintViolation, DatabaseError, Result};
use crate::storage::{scan_prefix, EngineTransaction};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

const FIRST_STORE_ID: u32 = 1;

/// In-transaction view of the catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    reserved_prefix: String,
    tables: BTreeMap<String, TableInfo>,
    indexes: BTreeMap<String, IndexConfig>,
}

fn put_record<T: Serialize>(tx: &mut dyn EngineTransaction, key: &[u8], record: &T) -> Result<()> {
    let bytes = bincode::serialize(record)?;
    tx.put(key, &bytes)?;
    Ok(())
}

impl Catalog {
    /// Read every table and index record
    pub fn load(tx: &dyn EngineTransaction, reserved_prefix: &str) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for (_, bytes) in scan_prefix(tx, &keys::catalog_table_prefix())? {
            let info: TableInfo = bincode::deserialize(&bytes)?;
            tables.insert(info.name.clone(), info);
        }

        let mut indexes = BTreeMap::new();
        for (_, bytes) in scan_prefix(tx, &keys::catalog_index_prefix())? {
            let config: IndexConfig = bincode::deserialize(&bytes)?;
            indexes.insert(config.index_name.clone(), config);
        }

        debug!(
            "Loaded catalog: {} tables, {} indexes",
            tables.len(),
            indexes.len()
        );

        Ok(Self {
            reserved_prefix: reserved_prefix.to_string(),
            tables,
            indexes,
        })
    }

    fn allocate_store_id(tx: &mut dyn EngineTransaction) -> Result<u32> {
        let key = keys::next_store_id();
        let id = match tx.get(&key)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => FIRST_STORE_ID,
        };
        put_record(tx, &key, &(id + 1))?;
        Ok(id)
    }

    fn validate_table_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(DatabaseError::InvalidName(
                "table name must not be empty".to_string(),
            ));
        }
        if name.starts_with(&self.reserved_prefix) {
            return Err(DatabaseError::InvalidName(format!(
                "table name '{}' uses the reserved prefix '{}'",
                name, self.reserved_prefix
            )));
        }
        Ok(())
    }

    fn validate_constraints(name: &str, constraints: &[FieldConstraint]) -> Result<()> {
        let mut has_primary_key = false;
        for (i, fc) in constraints.iter().enumerate() {
            if constraints[..i].iter().any(|prev| prev.path == fc.path) {
                return Err(ConstraintViolation::DuplicateField {
                    path: fc.path.to_string(),
                }
                .into());
            }
            if fc.is_primary_key {
                if has_primary_key {
                    return Err(ConstraintViolation::MultiplePrimaryKeys {
                        table: name.to_string(),
                    }
                    .into());
                }
                has_primary_key = true;
            }
        }
        Ok(())
    }

    pub fn create_table(
        &mut self,
        tx: &mut dyn EngineTransaction,
        name: &str,
        info: Option<TableInfo>,
    ) -> Result<TableInfo> {
        self.validate_table_name(name)?;
        if self.tables.contains_key(name) {
            return Err(DatabaseError::TableAlreadyExists(name.to_string()));
        }

        let mut info = info.unwrap_or_default();
        Self::validate_constraints(name, &info.field_constraints)?;
        info.name = name.to_string();
        info.store_id = Self::allocate_store_id(tx)?;

        put_record(tx, &keys::catalog_table(name), &info)?;
        self.tables.insert(name.to_string(), info.clone());

        info!("Created table '{}'", name);
        Ok(info)
    }

    pub fn get_table(&self, name: &str) -> Result<&TableInfo> {
        self.tables
            .get(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Remove a table record and every index defined on it.
    ///
    /// Returns the removed metadata so the caller can release the data.
    pub fn drop_table(
        &mut self,
        tx: &mut dyn EngineTransaction,
        name: &str,
    ) -> Result<(TableInfo, Vec<IndexConfig>)> {
        let info = self.get_table(name)?.clone();
        let dropped_indexes = self.indexes_for_table(name);

        for config in &dropped_indexes {
            tx.delete(&keys::catalog_index(&config.index_name))?;
        }
        tx.delete(&keys::catalog_table(name))?;

        for config in &dropped_indexes {
            self.indexes.remove(&config.index_name);
        }
        self.tables.remove(name);

        info!(
            "Dropped table '{}' and {} index(es)",
            name,
            dropped_indexes.len()
        );
        Ok((info, dropped_indexes))
    }

    /// Rename a table and repoint every index that references it.
    pub fn rename_table(
        &mut self,
        tx: &mut dyn EngineTransaction,
        old_name: &str,
        new_name: &str,
    ) -> Result<()> {
        let mut info = self.get_table(old_name)?.clone();
        self.validate_table_name(new_name)?;
        if self.tables.contains_key(new_name) {
            return Err(DatabaseError::TableAlreadyExists(new_name.to_string()));
        }

        info.name = new_name.to_string();
        let renamed_indexes: Vec<IndexConfig> = self
            .indexes_for_table(old_name)
            .into_iter()
            .map(|mut config| {
                config.table_name = new_name.to_string();
                config
            })
            .collect();

        tx.delete(&keys::catalog_table(old_name))?;
        put_record(tx, &keys::catalog_table(new_name), &info)?;
        for config in &renamed_indexes {
            put_record(tx, &keys::catalog_index(&config.index_name), config)?;
        }

        self.tables.remove(old_name);
        self.tables.insert(new_name.to_string(), info);
        for config in renamed_indexes {
            self.indexes.insert(config.index_name.clone(), config);
        }

        info!("Renamed table '{}' to '{}'", old_name, new_name);
        Ok(())
    }

    pub fn add_field(
        &mut self,
        tx: &mut dyn EngineTransaction,
        table_name: &str,
        constraint: FieldConstraint,
    ) -> Result<()> {
        let mut info = self.get_table(table_name)?.clone();

        if info.constraint_for(&constraint.path).is_some() {
            return Err(ConstraintViolation::DuplicateField {
                path: constraint.path.to_string(),
            }
            .into());
        }
        if constraint.is_primary_key && info.primary_key().is_some() {
            return Err(ConstraintViolation::MultiplePrimaryKeys {
                table: table_name.to_string(),
            }
            .into());
        }

        debug!("Adding field '{}' to table '{}'", constraint.path, table_name);
        info.field_constraints.push(constraint);
        put_record(tx, &keys::catalog_table(table_name), &info)?;
        self.tables.insert(table_name.to_string(), info);
        Ok(())
    }

    pub fn create_index(
        &mut self,
        tx: &mut dyn EngineTransaction,
        mut config: IndexConfig,
    ) -> Result<IndexConfig> {
        if self.indexes.contains_key(&config.index_name) {
            return Err(DatabaseError::IndexAlreadyExists(config.index_name));
        }
        if config.index_name.is_empty() {
            return Err(DatabaseError::InvalidName(
                "index name must not be empty".to_string(),
            ));
        }
        self.get_table(&config.table_name)?;

        config.store_id = Self::allocate_store_id(tx)?;
        put_record(tx, &keys::catalog_index(&config.index_name), &config)?;
        self.indexes
            .insert(config.index_name.clone(), config.clone());

        info!(
            "Created {}index '{}' on {}({})",
            if config.unique { "unique " } else { "" },
            config.index_name,
            config.table_name,
            config.path
        );
        Ok(config)
    }

    pub fn drop_index(&mut self, tx: &mut dyn EngineTransaction, name: &str) -> Result<IndexConfig> {
        let config = self.get_index(name)?.clone();
        tx.delete(&keys::catalog_index(name))?;
        self.indexes.remove(name);

        info!("Dropped index '{}'", name);
        Ok(config)
    }

    pub fn get_index(&self, name: &str) -> Result<&IndexConfig> {
        self.indexes
            .get(name)
            .ok_or_else(|| DatabaseError::IndexNotFound(name.to_string()))
    }

    pub fn list_indexes(&self) -> Vec<IndexConfig> {
        self.indexes.values().cloned().collect()
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn indexes_for_table(&self, table_name: &str) -> Vec<IndexConfig> {
        self.indexes
            .values()
            .filter(|config| config.table_name == table_name)
            .cloned()
            .collect()
    }
}
