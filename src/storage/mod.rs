// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for all CRM entities on an embedded redb database (pure
//! Rust, ACID). One file under `DATA_DIR`, one table per entity plus the
//! unique/secondary indexes the repositories maintain.
//!
//! Concurrency: redb gives serialized write transactions and snapshot
//! reads, so a concurrent password change and login for the same identity
//! observe row-level atomicity without any locking in this crate.

pub mod database;
pub mod repository;

pub use database::{CrmDatabase, StoreError, StoreResult};
pub use repository::{
    CommunicationPreference, ContactRepository, CustomerCategory, CustomerRepository,
    CustomerStatus, NewContact, NewCustomer, NewUser, StoredContact, StoredCustomer, StoredUser,
    UserRepository, UserStatus,
};
