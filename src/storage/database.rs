// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded CRM database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: id → serialized StoredUser
//! - `users_by_username`: username → id (unique, case-sensitive)
//! - `users_by_email`: email → id (unique)
//! - `customers`: id → serialized StoredCustomer
//! - `contacts`: id → serialized StoredContact
//! - `contact_customer_index`: composite key (customer_id_be|contact_id_be) → contact_id
//! - `counters`: entity name → last allocated id

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

/// Primary table: user id → serialized StoredUser (JSON bytes).
pub(crate) const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Unique index: username → user id. Lookups are case-sensitive exact match.
pub(crate) const USERS_BY_USERNAME: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_username");

/// Unique index: email → user id.
pub(crate) const USERS_BY_EMAIL: TableDefinition<&str, u64> =
    TableDefinition::new("users_by_email");

/// Primary table: customer id → serialized StoredCustomer (JSON bytes).
pub(crate) const CUSTOMERS: TableDefinition<u64, &[u8]> = TableDefinition::new("customers");

/// Primary table: contact id → serialized StoredContact (JSON bytes).
pub(crate) const CONTACTS: TableDefinition<u64, &[u8]> = TableDefinition::new("contacts");

/// Index: composite key (customer_id_be ++ contact_id_be) → contact_id.
/// Big-endian ids keep range scans per customer in insertion order.
pub(crate) const CONTACT_CUSTOMER_INDEX: TableDefinition<&[u8], u64> =
    TableDefinition::new("contact_customer_index");

/// Id sequences: entity name → last allocated id.
pub(crate) const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Store error type shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Build the composite key for the contact_customer_index table.
pub(crate) fn contact_index_key(customer_id: u64, contact_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&customer_id.to_be_bytes());
    key.extend_from_slice(&contact_id.to_be_bytes());
    key
}

/// Range bounds covering every contact of one customer.
pub(crate) fn contact_index_range(customer_id: u64) -> (Vec<u8>, Vec<u8>) {
    let start = contact_index_key(customer_id, 0);
    let end = contact_index_key(customer_id, u64::MAX);
    (start, end)
}

/// Embedded ACID database holding all CRM entities.
pub struct CrmDatabase {
    pub(crate) db: Database,
}

impl CrmDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERS_BY_USERNAME)?;
            let _ = write_txn.open_table(USERS_BY_EMAIL)?;
            let _ = write_txn.open_table(CUSTOMERS)?;
            let _ = write_txn.open_table(CONTACTS)?;
            let _ = write_txn.open_table(CONTACT_CUSTOMER_INDEX)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

/// Allocate the next id for `entity` inside an open write transaction.
///
/// Allocation and the insert that uses the id share one transaction, so a
/// crash cannot leak or duplicate ids.
pub(crate) fn next_id(
    write_txn: &redb::WriteTransaction,
    entity: &str,
) -> StoreResult<u64> {
    let mut counters = write_txn.open_table(COUNTERS)?;
    let next = counters.get(entity)?.map(|v| v.value()).unwrap_or(0) + 1;
    counters.insert(entity, next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_all_tables() {
        let dir = TempDir::new().unwrap();
        let db = CrmDatabase::open(&dir.path().join("crm.redb")).unwrap();

        // A read transaction on a fresh database must see every table.
        use redb::ReadableDatabase;
        let read_txn = db.db.begin_read().unwrap();
        assert!(read_txn.open_table(USERS).is_ok());
        assert!(read_txn.open_table(CUSTOMERS).is_ok());
        assert!(read_txn.open_table(CONTACTS).is_ok());
        assert!(read_txn.open_table(COUNTERS).is_ok());
    }

    #[test]
    fn next_id_is_monotonic_per_entity() {
        let dir = TempDir::new().unwrap();
        let db = CrmDatabase::open(&dir.path().join("crm.redb")).unwrap();

        let write_txn = db.db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "users").unwrap(), 1);
        assert_eq!(next_id(&write_txn, "users").unwrap(), 2);
        assert_eq!(next_id(&write_txn, "customers").unwrap(), 1);
        write_txn.commit().unwrap();

        let write_txn = db.db.begin_write().unwrap();
        assert_eq!(next_id(&write_txn, "users").unwrap(), 3);
        write_txn.commit().unwrap();
    }

    #[test]
    fn contact_index_keys_sort_by_customer_then_contact() {
        assert!(contact_index_key(1, 99) < contact_index_key(2, 1));
        assert!(contact_index_key(2, 1) < contact_index_key(2, 2));

        let (start, end) = contact_index_range(2);
        assert!(start < contact_index_key(2, 1));
        assert!(contact_index_key(2, u64::MAX - 1) < end);
    }
}
