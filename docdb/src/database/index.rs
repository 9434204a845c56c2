// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Secondary indexes
//!
//! Entries live under the index's store prefix. The value part of an entry
//! key is the canonical encoding of the indexed value, so integers and
//! doubles with the same numeric value collide and sort together.

use super::keys;
use super::transaction::{clear_prefix, Transaction};
use crate::catalog::IndexConfig;
use crate::document::{canonical_type_tag, encode_canonical, EncodingError, Value, ValueType};
use crate::error::{DatabaseError, Result};
use log::debug;
use std::collections::HashSet;

/// Where an ascending index scan begins
#[derive(Debug, Clone, PartialEq)]
pub enum Pivot {
    /// The very first entry
    Start,
    /// The smallest entry of a type; the scan stays within that type
    TypeMin(ValueType),
    /// The first entry greater than or equal to a value of the same type
    Value(Value),
}

impl Pivot {
    pub fn min_of(value_type: ValueType) -> Self {
        Pivot::TypeMin(value_type)
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Pivot::Value(value.into())
    }
}

/// Handle on one index inside a transaction
pub struct Index<'tx> {
    tx: &'tx Transaction,
    config: IndexConfig,
}

impl<'tx> Index<'tx> {
    pub(crate) fn new(tx: &'tx Transaction, config: IndexConfig) -> Self {
        Self { tx, config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.index_name
    }

    fn entry_key(&self, encoded_value: &[u8], key: &[u8]) -> Vec<u8> {
        let primary_key = if self.config.unique { None } else { Some(key) };
        keys::index_entry(self.config.store_id(), encoded_value, primary_key)
    }

    /// Fail if a unique index already maps `value` to a different document
    pub(crate) fn check_unique(&self, value: &Value, key: &[u8]) -> Result<()> {
        if !self.config.unique {
            return Ok(());
        }
        let entry = self.entry_key(&encode_canonical(value), key);
        match self.tx.engine_ref()?.get(&entry)? {
            Some(existing) if existing != key => {
                Err(DatabaseError::DuplicateIndexValue(self.config.index_name.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Associate `value` with the document stored under `key`
    pub fn set(&self, value: &Value, key: &[u8]) -> Result<()> {
        self.tx.ensure_writable()?;
        self.check_unique(value, key)?;
        let entry = self.entry_key(&encode_canonical(value), key);
        self.tx.engine()?.put(&entry, key)?;
        Ok(())
    }

    /// Remove the association between `value` and `key`, if any
    pub fn delete(&self, value: &Value, key: &[u8]) -> Result<()> {
        self.tx.ensure_writable()?;
        let entry = self.entry_key(&encode_canonical(value), key);
        let mut engine = self.tx.engine()?;
        if self.config.unique {
            match engine.get(&entry)? {
                Some(existing) if existing == key => engine.delete(&entry)?,
                _ => {}
            }
        } else {
            engine.delete(&entry)?;
        }
        Ok(())
    }

    /// Visit entries in ascending order starting at `pivot`.
    ///
    /// The visitor receives the encoded value, the document key and whether
    /// the value equals the pivot. An error from the visitor ends the scan
    /// and is returned as is.
    pub fn ascend_greater_or_equal<F>(&self, pivot: &Pivot, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8], bool) -> Result<()>,
    {
        let prefix = keys::index_prefix(self.config.store_id());
        let mut start = prefix.clone();
        let mut bound = prefix.clone();
        let mut pivot_value = None;

        match pivot {
            Pivot::Start => {}
            Pivot::TypeMin(value_type) => {
                let tag = canonical_type_tag(*value_type);
                start.push(tag);
                bound.push(tag);
            }
            Pivot::Value(value) => {
                let encoded = encode_canonical(value);
                bound.push(encoded[0]);
                start.extend_from_slice(&encoded);
                pivot_value = Some(encoded);
            }
        }

        let entries = {
            let engine = self.tx.engine_ref()?;
            engine.scan(&start, &bound)?
        };

        for (entry, key) in &entries {
            let value_end = if self.config.unique {
                entry.len()
            } else {
                entry.len().saturating_sub(key.len())
            };
            if value_end < prefix.len() {
                return Err(EncodingError::UnexpectedEof.into());
            }
            let value = &entry[prefix.len()..value_end];
            let is_equal = pivot_value.as_deref() == Some(value);
            visit(value, key, is_equal)?;
        }
        Ok(())
    }

    /// Remove every entry, returning how many were removed
    pub fn truncate(&self) -> Result<usize> {
        self.tx.ensure_writable()?;
        let mut engine = self.tx.engine()?;
        clear_prefix(&mut *engine, &keys::index_prefix(self.config.store_id()))
    }

    /// Replace the whole index content with `entries`.
    ///
    /// Uniqueness is checked before anything is written.
    pub(crate) fn rebuild(&self, entries: Vec<(Value, Vec<u8>)>) -> Result<usize> {
        self.tx.ensure_writable()?;
        let encoded: Vec<(Vec<u8>, Vec<u8>)> = entries
            .into_iter()
            .map(|(value, key)| (encode_canonical(&value), key))
            .collect();

        if self.config.unique {
            let mut seen = HashSet::with_capacity(encoded.len());
            for (value, _) in &encoded {
                if !seen.insert(value.as_slice()) {
                    return Err(DatabaseError::DuplicateIndexValue(
                        self.config.index_name.clone(),
                    ));
                }
            }
        }

        let mut engine = self.tx.engine()?;
        let removed = clear_prefix(&mut *engine, &keys::index_prefix(self.config.store_id()))?;
        for (value, key) in &encoded {
            engine.put(&self.entry_key(value, key), key)?;
        }

        debug!(
            "Rebuilt index '{}': removed {}, wrote {}",
            self.config.index_name,
            removed,
            encoded.len()
        );
        Ok(encoded.len())
    }
}
