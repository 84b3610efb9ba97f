// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact repository.
//!
//! Contacts are nested under a customer. A composite-key index
//! (customer_id|contact_id) keeps per-customer scans cheap without reading
//! the whole contacts table.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Page, PageParams};

use super::super::database::{
    contact_index_key, contact_index_range, next_id, CrmDatabase, StoreError, StoreResult,
    CONTACTS, CONTACT_CUSTOMER_INDEX,
};

/// Preferred channel for reaching a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationPreference {
    Email,
    Phone,
    Both,
}

/// Contact row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredContact {
    pub id: u64,
    pub customer_id: u64,
    pub name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub communication_preference: CommunicationPreference,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Id of the user who created the record.
    pub created_by: u64,
}

/// Fields required to create a contact.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub customer_id: u64,
    pub name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub communication_preference: CommunicationPreference,
    pub created_by: u64,
}

/// Repository for contact rows.
pub struct ContactRepository<'a> {
    db: &'a CrmDatabase,
}

impl<'a> ContactRepository<'a> {
    pub fn new(db: &'a CrmDatabase) -> Self {
        Self { db }
    }

    /// Create a contact and its customer index entry.
    pub fn create(&self, new_contact: NewContact) -> StoreResult<StoredContact> {
        let write_txn = self.db.db.begin_write()?;
        let contact = {
            let mut contacts = write_txn.open_table(CONTACTS)?;
            let mut index = write_txn.open_table(CONTACT_CUSTOMER_INDEX)?;

            let id = next_id(&write_txn, "contacts")?;
            let now = Utc::now();
            let contact = StoredContact {
                id,
                customer_id: new_contact.customer_id,
                name: new_contact.name,
                position: new_contact.position,
                email: new_contact.email,
                phone: new_contact.phone,
                communication_preference: new_contact.communication_preference,
                created_at: now,
                updated_at: now,
                created_by: new_contact.created_by,
            };

            contacts.insert(id, serde_json::to_vec(&contact)?.as_slice())?;
            index.insert(
                contact_index_key(contact.customer_id, id).as_slice(),
                id,
            )?;
            contact
        };
        write_txn.commit()?;
        Ok(contact)
    }

    /// Get a contact belonging to a specific customer.
    ///
    /// A contact reached through the wrong customer path is NotFound, not
    /// leaked.
    pub fn get(&self, customer_id: u64, id: u64) -> StoreResult<StoredContact> {
        let read_txn = self.db.db.begin_read()?;
        let contacts = read_txn.open_table(CONTACTS)?;
        let contact: StoredContact = match contacts.get(id)? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => {
                return Err(StoreError::NotFound(format!(
                    "Contact not found with id: {id}"
                )))
            }
        };
        if contact.customer_id != customer_id {
            return Err(StoreError::NotFound(format!(
                "Contact not found with id: {id}"
            )));
        }
        Ok(contact)
    }

    /// Persist an updated contact row; id, customer_id, created_at, and
    /// created_by are preserved, updated_at is stamped here.
    pub fn update(&self, contact: &StoredContact) -> StoreResult<StoredContact> {
        let write_txn = self.db.db.begin_write()?;
        let updated = {
            let mut contacts = write_txn.open_table(CONTACTS)?;
            let existing: StoredContact = match contacts.get(contact.id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => {
                    return Err(StoreError::NotFound(format!(
                        "Contact not found with id: {}",
                        contact.id
                    )))
                }
            };

            let updated = StoredContact {
                customer_id: existing.customer_id,
                created_at: existing.created_at,
                created_by: existing.created_by,
                updated_at: Utc::now(),
                ..contact.clone()
            };
            contacts.insert(contact.id, serde_json::to_vec(&updated)?.as_slice())?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a contact and its index entry.
    pub fn delete(&self, customer_id: u64, id: u64) -> StoreResult<()> {
        let write_txn = self.db.db.begin_write()?;
        {
            let mut contacts = write_txn.open_table(CONTACTS)?;
            let mut index = write_txn.open_table(CONTACT_CUSTOMER_INDEX)?;

            let contact: StoredContact = match contacts.get(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => {
                    return Err(StoreError::NotFound(format!(
                        "Contact not found with id: {id}"
                    )))
                }
            };
            if contact.customer_id != customer_id {
                return Err(StoreError::NotFound(format!(
                    "Contact not found with id: {id}"
                )));
            }

            contacts.remove(id)?;
            index.remove(contact_index_key(customer_id, id).as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All contacts of one customer matching `filter`, sorted by name, paged.
    fn page_filtered(
        &self,
        customer_id: u64,
        params: &PageParams,
        filter: impl Fn(&StoredContact) -> bool,
    ) -> StoreResult<Page<StoredContact>> {
        let read_txn = self.db.db.begin_read()?;
        let index = read_txn.open_table(CONTACT_CUSTOMER_INDEX)?;
        let contacts = read_txn.open_table(CONTACTS)?;

        let (start, end) = contact_index_range(customer_id);
        let mut matching = Vec::new();
        for entry in index.range::<&[u8]>(start.as_slice()..=end.as_slice())? {
            let (_, id_value) = entry?;
            let id = id_value.value();
            if let Some(value) = contacts.get(id)? {
                let contact: StoredContact = serde_json::from_slice(value.value())?;
                if filter(&contact) {
                    matching.push(contact);
                }
            }
        }
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Page::from_sorted(matching, params))
    }

    /// List all contacts of a customer.
    pub fn list(&self, customer_id: u64, params: &PageParams) -> StoreResult<Page<StoredContact>> {
        self.page_filtered(customer_id, params, |_| true)
    }

    /// Case-insensitive substring search over name, email, and phone.
    pub fn search(
        &self,
        customer_id: u64,
        query: &str,
        params: &PageParams,
    ) -> StoreResult<Page<StoredContact>> {
        let needle = query.to_lowercase();
        self.page_filtered(customer_id, params, |c| {
            c.name.to_lowercase().contains(&needle)
                || c.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
                || c.phone
                    .as_deref()
                    .is_some_and(|p| p.to_lowercase().contains(&needle))
        })
    }

    /// Filter by communication preference.
    pub fn find_by_preference(
        &self,
        customer_id: u64,
        preference: CommunicationPreference,
        params: &PageParams,
    ) -> StoreResult<Page<StoredContact>> {
        self.page_filtered(customer_id, params, |c| {
            c.communication_preference == preference
        })
    }
}
