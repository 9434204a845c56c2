// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Table handles and document storage
//!
//! Documents are stored under `table_prefix(store_id) ++ key`. The key is the
//! encoded primary key value, or an encoded integer drawn from the table
//! sequence when the table has no primary key. Every write keeps the
//! table's indexes in step.

use super::index::Index;
use super::keys;
use super::transaction::{clear_prefix, Transaction};
use crate::catalog::TableInfo;
use crate::document::{encode, Document, Value};
use crate::error::{ConstraintViolation, DatabaseError, Result};
use crate::storage::scan_prefix;
use crate::stream::{Environment, Source, Step, Visit};
use log::debug;

/// Handle on one table inside a transaction
pub struct Table<'tx> {
    tx: &'tx Transaction,
    name: String,
}

/// Apply field constraints in declaration order, coercing typed fields
fn validate(info: &TableInfo, mut doc: Document) -> Result<Document> {
    for constraint in &info.field_constraints {
        let replacement = match doc.get_path(&constraint.path) {
            None | Some(Value::Null) => {
                if constraint.is_not_null || constraint.is_primary_key {
                    return Err(ConstraintViolation::NotNull {
                        path: constraint.path.to_string(),
                    }
                    .into());
                }
                None
            }
            Some(value) => match constraint.value_type {
                Some(expected) if value.value_type() != expected => {
                    let converted = value.convert_to(expected).ok_or_else(|| {
                        ConstraintViolation::TypeMismatch {
                            path: constraint.path.to_string(),
                            expected,
                            actual: value.value_type(),
                        }
                    })?;
                    Some(converted)
                }
                _ => None,
            },
        };

        if let Some(value) = replacement {
            doc.replace_path(&constraint.path, value);
        }
    }
    Ok(doc)
}

impl<'tx> Table<'tx> {
    pub(crate) fn new(tx: &'tx Transaction, name: &str) -> Self {
        Self {
            tx,
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current metadata, re-read from the transaction's catalog
    pub fn info(&self) -> Result<TableInfo> {
        self.tx.table_info(&self.name)
    }

    fn indexes(&self) -> Vec<Index<'tx>> {
        self.tx
            .indexes_for_table(&self.name)
            .into_iter()
            .map(|config| Index::new(self.tx, config))
            .collect()
    }

    fn last_sequence(&self, store_id: u32) -> Result<u64> {
        let engine = self.tx.engine_ref()?;
        match engine.get(&keys::sequence(store_id))? {
            Some(bytes) => Ok(bincode::deserialize(&bytes)?),
            None => Ok(0),
        }
    }

    /// The key a validated document will be stored under, plus the new
    /// sequence value when one was drawn.
    fn document_key(&self, info: &TableInfo, doc: &Document) -> Result<(Vec<u8>, Option<u64>)> {
        match info.primary_key() {
            Some(pk) => {
                let value = doc.get_path(&pk.path).ok_or_else(|| ConstraintViolation::NotNull {
                    path: pk.path.to_string(),
                })?;
                Ok((encode(value), None))
            }
            None => {
                let next = self.last_sequence(info.store_id())? + 1;
                Ok((encode(&Value::Integer(next as i64)), Some(next)))
            }
        }
    }

    /// Validate and store a document.
    ///
    /// Returns the key it was stored under and the document as stored,
    /// after type coercion.
    pub fn insert(&self, doc: Document) -> Result<(Vec<u8>, Document)> {
        self.tx.ensure_writable()?;
        let info = self.info()?;
        let doc = validate(&info, doc)?;
        let store_id = info.store_id();

        let (key, sequence) = self.document_key(&info, &doc)?;
        let record_key = keys::table_record(store_id, &key);
        if self.tx.engine_ref()?.get(&record_key)?.is_some() {
            return Err(ConstraintViolation::DuplicatePrimaryKey.into());
        }

        let indexes = self.indexes();
        for index in &indexes {
            if let Some(value) = doc.get_path(&index.config().path) {
                index.check_unique(value, &key)?;
            }
        }

        let record = bincode::serialize(&doc)?;
        {
            let mut engine = self.tx.engine()?;
            if let Some(next) = sequence {
                engine.put(&keys::sequence(store_id), &bincode::serialize(&next)?)?;
            }
            engine.put(&record_key, &record)?;
        }
        for index in &indexes {
            if let Some(value) = doc.get_path(&index.config().path) {
                index.set(value, &key)?;
            }
        }

        debug!("Inserted document into '{}'", self.name);
        Ok((key, doc))
    }

    pub fn get(&self, key: &[u8]) -> Result<Document> {
        let info = self.info()?;
        let engine = self.tx.engine_ref()?;
        let bytes = engine
            .get(&keys::table_record(info.store_id(), key))?
            .ok_or(DatabaseError::DocumentNotFound)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    /// Delete the document stored under `key` and its index entries
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.tx.ensure_writable()?;
        let info = self.info()?;
        let doc = self.get(key)?;

        for index in self.indexes() {
            if let Some(value) = doc.get_path(&index.config().path) {
                index.delete(value, key)?;
            }
        }
        self.tx
            .engine()?
            .delete(&keys::table_record(info.store_id(), key))?;
        Ok(())
    }

    /// Replace the document stored under `key`. The primary key, if any,
    /// must not change.
    pub fn replace(&self, key: &[u8], doc: Document) -> Result<Document> {
        self.tx.ensure_writable()?;
        let info = self.info()?;
        let old = self.get(key)?;
        let doc = validate(&info, doc)?;

        if let Some(pk) = info.primary_key() {
            let new_key = doc.get_path(&pk.path).map(encode);
            if new_key.as_deref() != Some(key) {
                return Err(ConstraintViolation::PrimaryKeyMismatch.into());
            }
        }

        let indexes = self.indexes();
        for index in &indexes {
            if let Some(value) = doc.get_path(&index.config().path) {
                index.check_unique(value, key)?;
            }
        }

        for index in &indexes {
            if let Some(value) = old.get_path(&index.config().path) {
                index.delete(value, key)?;
            }
        }
        let record = bincode::serialize(&doc)?;
        self.tx
            .engine()?
            .put(&keys::table_record(info.store_id(), key), &record)?;
        for index in &indexes {
            if let Some(value) = doc.get_path(&index.config().path) {
                index.set(value, key)?;
            }
        }
        Ok(doc)
    }

    /// Remove every document and every entry of the table's indexes
    pub fn truncate(&self) -> Result<()> {
        self.tx.ensure_writable()?;
        let info = self.info()?;
        let indexes = self.indexes();

        let mut engine = self.tx.engine()?;
        let removed = clear_prefix(&mut *engine, &keys::table_prefix(info.store_id()))?;
        for index in &indexes {
            clear_prefix(&mut *engine, &keys::index_prefix(index.config().store_id()))?;
        }

        debug!("Truncated '{}': {} document(s)", self.name, removed);
        Ok(())
    }

    /// Visit documents in key order with their keys.
    ///
    /// The scan is materialized first, so `visit` may write through the
    /// same transaction.
    pub fn iterate_documents<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], Document) -> Result<Step>,
    {
        let prefix = keys::table_prefix(self.info()?.store_id());
        let records = {
            let engine = self.tx.engine_ref()?;
            scan_prefix(&*engine, &prefix)?
        };

        for (record_key, bytes) in records {
            let doc: Document = bincode::deserialize(&bytes)?;
            if visit(&record_key[prefix.len()..], doc)? == Step::Stop {
                break;
            }
        }
        Ok(())
    }
}

impl Source for Table<'_> {
    fn iterate(&self, visit: &mut Visit<'_>) -> Result<()> {
        self.iterate_documents(|_, doc| {
            let env = Environment::from_value(Value::Document(doc));
            visit(&env)
        })
    }
}
