// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the embedded database.
//!
//! Each repository provides CRUD operations for a specific entity type,
//! using the CrmDatabase for all transactional work.

pub mod contacts;
pub mod customers;
pub mod users;

pub use contacts::{CommunicationPreference, ContactRepository, NewContact, StoredContact};
pub use customers::{
    CustomerCategory, CustomerRepository, CustomerStatus, NewCustomer, StoredCustomer,
};
pub use users::{NewUser, StoredUser, UserRepository, UserStatus};
