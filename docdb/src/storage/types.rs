// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Storage engine types and error handling
//!
//! This module defines the backend selector and the error type shared by
//! every storage engine implementation.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Storage engine type configuration
///
/// Specifies which underlying key-value store backs a database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Memory - ordered in-memory map, lost on drop
    /// Best for: Unit testing, scratch databases
    #[default]
    Memory,

    /// Sled - Pure Rust embedded database
    /// Best for: Production, development
    Sled,

    /// Redb - Pure Rust ACID-compliant embedded database
    /// Best for: ACID guarantees, crash-safety
    Redb,
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "sled" => Ok(StorageType::Sled),
            "redb" => Ok(StorageType::Redb),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: memory, sled, redb",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Memory => "memory",
            StorageType::Sled => "sled",
            StorageType::Redb => "redb",
        };
        write!(f, "{}", name)
    }
}

/// Error type for storage engine operations
#[derive(Debug)]
pub enum StorageDriverError {
    /// I/O related errors
    IoError(std::io::Error),

    /// Data serialization failed
    SerializationError(String),

    /// A write was attempted through a read-only transaction
    ReadOnly,

    /// Another writable transaction is already open on the engine
    WriteConflict,

    /// The requested backend was not compiled in or is misconfigured
    Unsupported(String),

    /// Engine-specific error (Sled, Redb, ...)
    BackendSpecific(String),
}

impl std::fmt::Display for StorageDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageDriverError::IoError(e) => write!(f, "I/O error: {}", e),
            StorageDriverError::SerializationError(e) => write!(f, "Serialization error: {}", e),
            StorageDriverError::ReadOnly => write!(f, "Transaction is read-only"),
            StorageDriverError::WriteConflict => {
                write!(f, "Another write transaction is already in progress")
            }
            StorageDriverError::Unsupported(e) => write!(f, "Unsupported storage: {}", e),
            StorageDriverError::BackendSpecific(e) => write!(f, "Storage engine error: {}", e),
        }
    }
}

impl std::error::Error for StorageDriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageDriverError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageDriverError {
    fn from(e: std::io::Error) -> Self {
        StorageDriverError::IoError(e)
    }
}

impl From<bincode::Error> for StorageDriverError {
    fn from(e: bincode::Error) -> Self {
        StorageDriverError::SerializationError(e.to_string())
    }
}

/// Result type for storage engine operations
pub type StorageResult<T> = Result<T, StorageDriverError>;

/// A key/value pair returned by a range scan
pub type KvPair = (Vec<u8>, Vec<u8>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_parse_and_display() {
        assert_eq!("Memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!("sled".parse::<StorageType>().unwrap(), StorageType::Sled);
        assert_eq!("REDB".parse::<StorageType>().unwrap(), StorageType::Redb);
        assert!("rocksdb".parse::<StorageType>().is_err());
        assert_eq!(StorageType::Redb.to_string(), "redb");
    }
}
