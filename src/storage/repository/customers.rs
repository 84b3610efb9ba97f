// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Customer repository.
//!
//! Customers are the primary CRM records. Search is a case-insensitive
//! substring match over name, company, and email; every paged read sorts by
//! name to match the frontend's table ordering.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Page, PageParams};

use super::super::database::{next_id, CrmDatabase, StoreError, StoreResult, CUSTOMERS};

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

/// Commercial tier of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerCategory {
    Regular,
    Premium,
    Enterprise,
}

/// Customer row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCustomer {
    pub id: u64,
    pub name: String,
    pub company: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub category: CustomerCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Id of the user who created the record.
    pub created_by: u64,
}

/// Fields required to create a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub company: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub category: CustomerCategory,
    pub created_by: u64,
}

/// Repository for customer rows.
pub struct CustomerRepository<'a> {
    db: &'a CrmDatabase,
}

impl<'a> CustomerRepository<'a> {
    pub fn new(db: &'a CrmDatabase) -> Self {
        Self { db }
    }

    /// Create a customer. New customers start out active.
    pub fn create(&self, new_customer: NewCustomer) -> StoreResult<StoredCustomer> {
        let write_txn = self.db.db.begin_write()?;
        let customer = {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            let id = next_id(&write_txn, "customers")?;
            let now = Utc::now();
            let customer = StoredCustomer {
                id,
                name: new_customer.name,
                company: new_customer.company,
                title: new_customer.title,
                email: new_customer.email,
                phone: new_customer.phone,
                address: new_customer.address,
                status: CustomerStatus::Active,
                category: new_customer.category,
                created_at: now,
                updated_at: now,
                created_by: new_customer.created_by,
            };
            customers.insert(id, serde_json::to_vec(&customer)?.as_slice())?;
            customer
        };
        write_txn.commit()?;
        Ok(customer)
    }

    /// Check if a customer exists.
    pub fn exists(&self, id: u64) -> StoreResult<bool> {
        let read_txn = self.db.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;
        Ok(customers.get(id)?.is_some())
    }

    /// Get a customer by id.
    pub fn get(&self, id: u64) -> StoreResult<StoredCustomer> {
        let read_txn = self.db.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;
        match customers.get(id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!(
                "Customer not found with id: {id}"
            ))),
        }
    }

    /// Persist an updated customer row; id, created_at, and created_by are
    /// preserved, updated_at is stamped here.
    pub fn update(&self, customer: &StoredCustomer) -> StoreResult<StoredCustomer> {
        let write_txn = self.db.db.begin_write()?;
        let updated = {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            let existing: StoredCustomer = match customers.get(customer.id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => {
                    return Err(StoreError::NotFound(format!(
                        "Customer not found with id: {}",
                        customer.id
                    )))
                }
            };

            let updated = StoredCustomer {
                created_at: existing.created_at,
                created_by: existing.created_by,
                updated_at: Utc::now(),
                ..customer.clone()
            };
            customers.insert(customer.id, serde_json::to_vec(&updated)?.as_slice())?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a customer.
    pub fn delete(&self, id: u64) -> StoreResult<()> {
        let write_txn = self.db.db.begin_write()?;
        {
            let mut customers = write_txn.open_table(CUSTOMERS)?;
            if customers.remove(id)?.is_none() {
                return Err(StoreError::NotFound(format!(
                    "Customer not found with id: {id}"
                )));
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List customers matching `filter`, sorted by name, paged.
    fn page_filtered(
        &self,
        params: &PageParams,
        filter: impl Fn(&StoredCustomer) -> bool,
    ) -> StoreResult<Page<StoredCustomer>> {
        let read_txn = self.db.db.begin_read()?;
        let customers = read_txn.open_table(CUSTOMERS)?;

        let mut matching = Vec::new();
        for entry in customers.iter()? {
            let (_, value) = entry?;
            let customer: StoredCustomer = serde_json::from_slice(value.value())?;
            if filter(&customer) {
                matching.push(customer);
            }
        }
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Page::from_sorted(matching, params))
    }

    /// List all customers.
    pub fn list(&self, params: &PageParams) -> StoreResult<Page<StoredCustomer>> {
        self.page_filtered(params, |_| true)
    }

    /// Case-insensitive substring search over name, company, and email.
    pub fn search(&self, query: &str, params: &PageParams) -> StoreResult<Page<StoredCustomer>> {
        let needle = query.to_lowercase();
        self.page_filtered(params, |c| {
            c.name.to_lowercase().contains(&needle)
                || c.company.to_lowercase().contains(&needle)
                || c.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
    }

    /// Filter by status.
    pub fn find_by_status(
        &self,
        status: CustomerStatus,
        params: &PageParams,
    ) -> StoreResult<Page<StoredCustomer>> {
        self.page_filtered(params, |c| c.status == status)
    }

    /// Filter by category.
    pub fn find_by_category(
        &self,
        category: CustomerCategory,
        params: &PageParams,
    ) -> StoreResult<Page<StoredCustomer>> {
        self.page_filtered(params, |c| c.category == category)
    }

    /// Customers created by a specific user ("my customers").
    pub fn find_by_created_by(
        &self,
        user_id: u64,
        params: &PageParams,
    ) -> StoreResult<Page<StoredCustomer>> {
        self.page_filtered(params, |c| c.created_by == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (CrmDatabase, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = CrmDatabase::open(&dir.path().join("crm.redb")).unwrap();
        (db, dir)
    }

    fn new_customer(name: &str, company: &str, created_by: u64) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            company: company.to_string(),
            title: None,
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            address: None,
            category: CustomerCategory::Regular,
            created_by,
        }
    }

    #[test]
    fn create_get_update_delete_cycle() {
        let (db, _dir) = test_db();
        let repo = CustomerRepository::new(&db);

        let created = repo.create(new_customer("Acme", "Acme Corp", 1)).unwrap();
        assert_eq!(created.status, CustomerStatus::Active);

        let mut fetched = repo.get(created.id).unwrap();
        fetched.status = CustomerStatus::Inactive;
        fetched.category = CustomerCategory::Premium;
        let updated = repo.update(&fetched).unwrap();
        assert_eq!(updated.status, CustomerStatus::Inactive);
        assert_eq!(updated.created_at, created.created_at);

        repo.delete(created.id).unwrap();
        assert!(matches!(
            repo.get(created.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn update_preserves_created_by() {
        let (db, _dir) = test_db();
        let repo = CustomerRepository::new(&db);
        let created = repo.create(new_customer("Acme", "Acme Corp", 7)).unwrap();

        let mut tampered = created.clone();
        tampered.created_by = 99;
        let updated = repo.update(&tampered).unwrap();
        assert_eq!(updated.created_by, 7);
    }

    #[test]
    fn search_matches_name_company_and_email() {
        let (db, _dir) = test_db();
        let repo = CustomerRepository::new(&db);
        repo.create(new_customer("Acme", "Widgets Inc", 1)).unwrap();
        repo.create(new_customer("Globex", "ACME Holdings", 1))
            .unwrap();
        repo.create(new_customer("Initech", "Paper LLC", 1)).unwrap();

        let page = repo.search("acme", &PageParams::default()).unwrap();
        let names: Vec<&str> = page.content.iter().map(|c| c.name.as_str()).collect();
        // "Acme" by name/email, "Globex" by company.
        assert_eq!(names, vec!["Acme", "Globex"]);
    }

    #[test]
    fn filters_by_status_category_and_creator() {
        let (db, _dir) = test_db();
        let repo = CustomerRepository::new(&db);
        let a = repo.create(new_customer("Acme", "Acme Corp", 1)).unwrap();
        repo.create(new_customer("Globex", "Globex Corp", 2)).unwrap();

        let mut inactive = a.clone();
        inactive.status = CustomerStatus::Inactive;
        inactive.category = CustomerCategory::Enterprise;
        repo.update(&inactive).unwrap();

        let by_status = repo
            .find_by_status(CustomerStatus::Inactive, &PageParams::default())
            .unwrap();
        assert_eq!(by_status.content.len(), 1);
        assert_eq!(by_status.content[0].id, a.id);

        let by_category = repo
            .find_by_category(CustomerCategory::Enterprise, &PageParams::default())
            .unwrap();
        assert_eq!(by_category.content.len(), 1);

        let mine = repo
            .find_by_created_by(2, &PageParams::default())
            .unwrap();
        assert_eq!(mine.content.len(), 1);
        assert_eq!(mine.content[0].name, "Globex");
    }

    #[test]
    fn list_pages_sorted_by_name() {
        let (db, _dir) = test_db();
        let repo = CustomerRepository::new(&db);
        for name in ["Zeta", "Alpha", "Mid"] {
            repo.create(new_customer(name, "Co", 1)).unwrap();
        }

        let page = repo
            .list(&PageParams { page: 0, size: 2 })
            .unwrap();
        let names: Vec<&str> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid"]);
        assert_eq!(page.total_pages, 2);
    }
}
