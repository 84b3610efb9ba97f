// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! The auth core reads this table for login verification; everything that
//! writes roles or status goes through the admin user-management API.
//! Username is immutable and unique (case-sensitive); email is mutable and
//! unique.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::models::{Page, PageParams};

use super::super::database::{
    next_id, CrmDatabase, StoreError, StoreResult, USERS, USERS_BY_EMAIL, USERS_BY_USERNAME,
};

/// Account status. Inactive identities fail authentication regardless of
/// credential validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// User row as persisted.
///
/// `password_hash` is a bcrypt hash; the plaintext secret exists only in the
/// login request and is never stored or logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// Whether this identity may authenticate.
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Fields required to create a user. The id and timestamps are assigned by
/// the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Repository for user rows.
pub struct UserRepository<'a> {
    db: &'a CrmDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a CrmDatabase) -> Self {
        Self { db }
    }

    /// Create a user, enforcing username and email uniqueness atomically.
    pub fn create(&self, new_user: NewUser) -> StoreResult<StoredUser> {
        let write_txn = self.db.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            if by_username.get(new_user.username.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "Username already exists: {}",
                    new_user.username
                )));
            }
            if by_email.get(new_user.email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "Email already exists: {}",
                    new_user.email
                )));
            }

            let id = next_id(&write_txn, "users")?;
            let now = Utc::now();
            let user = StoredUser {
                id,
                username: new_user.username,
                email: new_user.email,
                password_hash: new_user.password_hash,
                role: new_user.role,
                status: UserStatus::Active,
                created_at: now,
                updated_at: now,
            };

            users.insert(id, serde_json::to_vec(&user)?.as_slice())?;
            by_username.insert(user.username.as_str(), id)?;
            by_email.insert(user.email.as_str(), id)?;
            user
        };
        write_txn.commit()?;
        Ok(user)
    }

    /// Get a user by id.
    pub fn get(&self, id: u64) -> StoreResult<StoredUser> {
        let read_txn = self.db.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!(
                "User not found with id: {id}"
            ))),
        }
    }

    /// Look up a user by username. Exact, case-sensitive match.
    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.db.begin_read()?;
        let by_username = read_txn.open_table(USERS_BY_USERNAME)?;
        let id = match by_username.get(username)? {
            Some(value) => value.value(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a user by email.
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let read_txn = self.db.db.begin_read()?;
        let by_email = read_txn.open_table(USERS_BY_EMAIL)?;
        let id = match by_email.get(email)? {
            Some(value) => value.value(),
            None => return Ok(None),
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Persist an updated user row, keeping the email index in sync.
    ///
    /// The username is immutable; `updated_at` is stamped here.
    pub fn update(&self, user: &StoredUser) -> StoreResult<StoredUser> {
        let write_txn = self.db.db.begin_write()?;
        let updated = {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            let existing: StoredUser = match users.get(user.id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => {
                    return Err(StoreError::NotFound(format!(
                        "User not found with id: {}",
                        user.id
                    )))
                }
            };

            if existing.email != user.email {
                if let Some(other) = by_email.get(user.email.as_str())? {
                    if other.value() != user.id {
                        return Err(StoreError::AlreadyExists(format!(
                            "Email already exists: {}",
                            user.email
                        )));
                    }
                }
                by_email.remove(existing.email.as_str())?;
                by_email.insert(user.email.as_str(), user.id)?;
            }

            let updated = StoredUser {
                username: existing.username,
                created_at: existing.created_at,
                updated_at: Utc::now(),
                ..user.clone()
            };
            users.insert(user.id, serde_json::to_vec(&updated)?.as_slice())?;
            updated
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Replace the password hash wholesale.
    pub fn set_password_hash(&self, id: u64, password_hash: &str) -> StoreResult<()> {
        let mut user = self.get(id)?;
        user.password_hash = password_hash.to_string();
        self.update(&user)?;
        Ok(())
    }

    /// Delete a user and its index entries.
    pub fn delete(&self, id: u64) -> StoreResult<()> {
        let write_txn = self.db.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_username = write_txn.open_table(USERS_BY_USERNAME)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            let user: StoredUser = match users.remove(id)? {
                Some(value) => serde_json::from_slice(value.value())?,
                None => {
                    return Err(StoreError::NotFound(format!(
                        "User not found with id: {id}"
                    )))
                }
            };
            by_username.remove(user.username.as_str())?;
            by_email.remove(user.email.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// List users, sorted by username.
    pub fn list(&self, params: &PageParams) -> StoreResult<Page<StoredUser>> {
        let read_txn = self.db.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;

        let mut all = Vec::new();
        for entry in users.iter()? {
            let (_, value) = entry?;
            all.push(serde_json::from_slice::<StoredUser>(value.value())?);
        }
        all.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(Page::from_sorted(all, params))
    }
}
