// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Buffered writes for backends without native multi-key transactions
//!
//! Memory and sled transactions stage their writes in a [`WriteOverlay`] and
//! publish them in one step on commit. [`WriterSlot`] enforces the single
//! writer rule for every backend.

use super::types::{KvPair, StorageDriverError, StorageResult};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pending writes of one transaction. `None` marks a deletion.
#[derive(Debug, Default)]
pub struct WriteOverlay {
    pending: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteOverlay {
    /// Look a key up in the pending writes.
    ///
    /// Returns `None` when the key was not touched, `Some(None)` when it was
    /// deleted and `Some(Some(v))` when it was written.
    pub fn get(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.pending.get(key).map(|v| v.as_deref())
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.pending.insert(key.to_vec(), Some(value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.pending.insert(key.to_vec(), None);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Merge a committed range (already restricted to `start`/`prefix`) with
    /// the pending writes covering the same range.
    pub fn merge_scan(&self, base: Vec<KvPair>, start: &[u8], prefix: &[u8]) -> Vec<KvPair> {
        if self.pending.is_empty() {
            return base;
        }

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = base.into_iter().collect();
        for (key, value) in self
            .pending
            .range(start.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            match value {
                Some(v) => {
                    merged.insert(key.clone(), v.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        merged.into_iter().collect()
    }

    /// Consume the overlay, yielding writes in key order
    pub fn into_writes(self) -> impl Iterator<Item = (Vec<u8>, Option<Vec<u8>>)> {
        self.pending.into_iter()
    }
}

/// Exclusive right to write, released on drop
#[derive(Debug)]
pub struct WriterSlot {
    flag: Arc<AtomicBool>,
}

impl WriterSlot {
    pub fn acquire(flag: &Arc<AtomicBool>) -> StorageResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StorageDriverError::WriteConflict)?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for WriterSlot {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Collect an ascending range of a sorted source, bounded by `prefix`
pub(crate) fn collect_range<'a, I>(iter: I, prefix: &[u8]) -> Vec<KvPair>
where
    I: Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)>,
{
    iter.take_while(|(k, _)| k.starts_with(prefix))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
