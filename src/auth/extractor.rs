// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Anonymous routes (login, health, docs) simply do not use the extractor;
//! the route table decides which operations are protected.
//!
//! Per request the flow is: extract bearer token → validate (signature,
//! structure, expiry) → bind identity for the rest of request processing.
//! Any failure rejects the request with the status mapped in
//! [`crate::auth::error`]. Nothing is retained across requests.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Validates the JWT from the Authorization header against the process-wide
/// secret and provides the request-scoped identity.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // An identity already bound to this request (e.g. by a test or an
        // upstream layer) wins over re-validating the header.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        // Extract Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        // Signature, structure, and expiry; errors propagate unmodified.
        let claims = state.tokens.validate(token)?;

        Ok(Auth(AuthenticatedUser::from_claims(claims)))
    }
}
