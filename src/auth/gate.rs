// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential-to-token exchange.
//!
//! Verifies a submitted username/password pair against the stored bcrypt
//! hash and, on success, delegates to [`TokenService`] for issuance.
//!
//! Lookup misses and hash mismatches return the same `InvalidCredentials`
//! error so responses cannot be used to enumerate usernames. An inactive
//! account is a distinct internal variant but renders the same 401 body.

use crate::storage::{CrmDatabase, UserRepository};

use super::error::AuthError;
use super::service::TokenService;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Stateless credential verifier producing signed tokens.
pub struct AuthenticationGate<'a> {
    db: &'a CrmDatabase,
    tokens: &'a TokenService,
}

impl<'a> AuthenticationGate<'a> {
    pub fn new(db: &'a CrmDatabase, tokens: &'a TokenService) -> Self {
        Self { db, tokens }
    }

    /// Exchange credentials for a token.
    ///
    /// The username lookup is a case-sensitive exact match. The plaintext
    /// password is never stored or logged.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let users = UserRepository::new(self.db);

        let user = users
            .find_by_username(username)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active() {
            tracing::info!(username = %user.username, "login rejected: account inactive");
            return Err(AuthError::AccountInactive);
        }

        // Authorities are copied at this instant; the token outlives any
        // later role or status change until it expires.
        self.tokens.issue(&user.username, &[user.role])
    }
}
