// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Database configuration

use crate::error::{DatabaseError, Result};
use crate::storage::{MemoryEngine, StorageEngine, StorageType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Table names starting with this prefix are reserved for internal use
pub const DEFAULT_RESERVED_PREFIX: &str = "__docdb_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Which storage engine backs the database
    pub storage_type: StorageType,
    /// Directory (sled) or file/directory (redb); ignored for memory
    pub path: Option<PathBuf>,
    /// Naming policy: user tables must not start with this prefix
    pub reserved_prefix: String,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            path: None,
            reserved_prefix: DEFAULT_RESERVED_PREFIX.to_string(),
        }
    }
}

impl DatabaseOptions {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn on_disk(storage_type: StorageType, path: impl Into<PathBuf>) -> Self {
        Self {
            storage_type,
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// Parse options from a JSON document; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DatabaseError::InvalidConfig(e.to_string()))
    }

    fn require_path(&self) -> Result<&PathBuf> {
        self.path.as_ref().ok_or_else(|| {
            DatabaseError::InvalidConfig(format!(
                "storage type '{}' requires a path",
                self.storage_type
            ))
        })
    }

    /// Build the configured storage engine
    pub fn open_engine(&self) -> Result<Arc<dyn StorageEngine>> {
        match self.storage_type {
            StorageType::Memory => Ok(Arc::new(MemoryEngine::new())),
            StorageType::Sled => self.open_sled(),
            StorageType::Redb => self.open_redb(),
        }
    }

    #[cfg(feature = "sled-backend")]
    fn open_sled(&self) -> Result<Arc<dyn StorageEngine>> {
        let path = self.require_path()?;
        Ok(Arc::new(crate::storage::SledEngine::open(path)?))
    }

    #[cfg(not(feature = "sled-backend"))]
    fn open_sled(&self) -> Result<Arc<dyn StorageEngine>> {
        Err(crate::storage::StorageDriverError::Unsupported(
            "built without the sled-backend feature".to_string(),
        )
        .into())
    }

    #[cfg(feature = "redb-backend")]
    fn open_redb(&self) -> Result<Arc<dyn StorageEngine>> {
        let path = self.require_path()?;
        Ok(Arc::new(crate::storage::RedbEngine::open(path)?))
    }

    #[cfg(not(feature = "redb-backend"))]
    fn open_redb(&self) -> Result<Arc<dyn StorageEngine>> {
        Err(crate::storage::StorageDriverError::Unsupported(
            "built without the redb-backend feature".to_string(),
        )
        .into())
    }
}
