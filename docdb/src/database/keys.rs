// Copyright (c) 2024-2025 DocDB Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Keyspace layout
//!
//! Every key starts with a one-byte namespace tag. Table and index data are
//! further prefixed by the owning store id, so renaming a table or an index
//! never moves data.

const CATALOG_TABLE: u8 = 0x01;
const CATALOG_INDEX: u8 = 0x02;
const CATALOG_META: u8 = 0x03;
const SEQUENCE: u8 = 0x04;
const TABLE_DATA: u8 = 0x10;
const INDEX_DATA: u8 = 0x11;

fn tagged(tag: u8, rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(rest.len() + 1);
    key.push(tag);
    key.extend_from_slice(rest);
    key
}

fn store_key(tag: u8, store_id: u32, rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(rest.len() + 5);
    key.push(tag);
    key.extend_from_slice(&store_id.to_be_bytes());
    key.extend_from_slice(rest);
    key
}

pub(crate) fn catalog_table(name: &str) -> Vec<u8> {
    tagged(CATALOG_TABLE, name.as_bytes())
}

pub(crate) fn catalog_table_prefix() -> Vec<u8> {
    vec![CATALOG_TABLE]
}

pub(crate) fn catalog_index(name: &str) -> Vec<u8> {
    tagged(CATALOG_INDEX, name.as_bytes())
}

pub(crate) fn catalog_index_prefix() -> Vec<u8> {
    vec![CATALOG_INDEX]
}

pub(crate) fn next_store_id() -> Vec<u8> {
    tagged(CATALOG_META, b"next_store_id")
}

pub(crate) fn sequence(store_id: u32) -> Vec<u8> {
    store_key(SEQUENCE, store_id, &[])
}

pub(crate) fn table_prefix(store_id: u32) -> Vec<u8> {
    store_key(TABLE_DATA, store_id, &[])
}

pub(crate) fn table_record(store_id: u32, primary_key: &[u8]) -> Vec<u8> {
    store_key(TABLE_DATA, store_id, primary_key)
}

pub(crate) fn index_prefix(store_id: u32) -> Vec<u8> {
    store_key(INDEX_DATA, store_id, &[])
}

/// Unique entries are keyed by value alone; non-unique entries append the
/// primary key so duplicates stay distinct.
pub(crate) fn index_entry(store_id: u32, value: &[u8], primary_key: Option<&[u8]>) -> Vec<u8> {
    let mut key = store_key(INDEX_DATA, store_id, value);
    if let Some(pk) = primary_key {
        key.extend_from_slice(pk);
    }
    key
}
