// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Pluggable storage engines
//!
//! This module provides:
//! - The transactional ordered key-value boundary consumed by the database core
//! - An in-memory engine for tests and scratch databases
//! - Sled and REDB engines for on-disk databases
//! - The write overlay shared by engines without native transactions

mod overlay;
pub mod memory;
pub mod traits;
pub mod types;

#[cfg(feature = "redb-backend")]
pub mod redb;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use memory::MemoryEngine;
pub use traits::{scan_prefix, EngineTransaction, StorageEngine};
pub use types::{KvPair, StorageDriverError, StorageResult, StorageType};

#[cfg(feature = "redb-backend")]
pub use self::redb::RedbEngine;
#[cfg(feature = "sled-backend")]
pub use self::sled::SledEngine;
