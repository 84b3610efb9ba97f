// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by an issued token.
///
/// Tokens are self-contained: the authority list is a copy of the identity's
/// roles at issuance time and is never refreshed from the store. Role changes
/// therefore do not affect already-issued tokens until they expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the identity's username
    pub sub: String,

    /// Authorities granted at issuance time
    pub authorities: Vec<Role>,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration (Unix timestamp, seconds)
    pub exp: i64,
}

/// Authenticated user information bound to a request.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a request. It is produced by the `Auth`
/// extractor and lives only for the duration of one request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Username (the token's `sub` claim)
    pub username: String,

    /// Roles granted at token issuance
    pub roles: Vec<Role>,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build the request-scoped identity from validated claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.authorities,
            expires_at: claims.exp,
        }
    }

    /// Check if this user holds a specific role.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}
