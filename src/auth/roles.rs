// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// The set is closed: every identity carries exactly one of these labels,
/// and route requirements are expressed as slices of them (see
/// [`crate::auth::policy`]).
///
/// - `Admin` - Full access, including user administration
/// - `SalesManager` - Full customer/contact access, including deletes
/// - `SalesRepresentative` - Customer/contact read and write, no deletes of customers
/// - `ReadOnly` - Read-only access to customers and contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Sales manager (full customer/contact access)
    SalesManager,
    /// Sales representative (no customer deletes)
    SalesRepresentative,
    /// Read-only access
    ReadOnly,
}

impl Role {
    /// Parse a role from its wire label (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "SALES_MANAGER" => Some(Role::SalesManager),
            "SALES_REPRESENTATIVE" => Some(Role::SalesRepresentative),
            "READ_ONLY" => Some(Role::ReadOnly),
            _ => None,
        }
    }

    /// The wire label carried in tokens and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SalesManager => "SALES_MANAGER",
            Role::SalesRepresentative => "SALES_REPRESENTATIVE",
            Role::ReadOnly => "READ_ONLY",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
