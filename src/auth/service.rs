// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation policy.
//!
//! Layered on [`TokenCodec`]: the codec owns transcoding and signatures,
//! this service owns temporal policy (TTL, expiry) and subject matching.
//!
//! Tokens are not persisted and there is no revocation list: a token stays
//! valid until its natural expiry even if the identity's roles change or the
//! account is deactivated. This is a deliberate simplicity/availability
//! tradeoff; validation never touches the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::claims::Claims;
use super::codec::TokenCodec;
use super::error::AuthError;
use super::roles::Role;

/// Issues and validates signed tokens.
///
/// Cheap to clone; all state is immutable configuration shared behind an
/// `Arc`.
#[derive(Clone)]
pub struct TokenService {
    codec: Arc<TokenCodec>,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a service from the shared secret and configured TTL.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            codec: Arc::new(TokenCodec::new(secret)),
            ttl_secs: ttl.as_secs() as i64,
        }
    }

    /// Issue a token for an identity.
    ///
    /// The authority list is copied at this instant; later role changes do
    /// not propagate into the token.
    pub fn issue(&self, username: &str, roles: &[Role]) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            authorities: roles.to_vec(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        self.codec.encode(&claims)
    }

    /// Validate a token: signature, structure, and expiry.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.codec.decode(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Validate a token and require a specific subject.
    ///
    /// Guards against a valid token being replayed in the wrong context
    /// (e.g., presented for a different identity than the operation targets).
    pub fn validate_for_subject(
        &self,
        token: &str,
        expected_username: &str,
    ) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.sub != expected_username {
            return Err(AuthError::SubjectMismatch);
        }
        Ok(claims)
    }

    #[cfg(test)]
    pub(crate) fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
