// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access policy: role requirements as data, checked by a plain function.
//!
//! Each route declares its required-role set as a `const` slice below and
//! calls [`require`] at the top of its handler. A caller is allowed iff it
//! holds at least one of the required roles (OR semantics). The check runs
//! on every invocation; decisions are never cached across requests because
//! authorities differ per token.

use super::claims::AuthenticatedUser;
use super::error::AuthError;
use super::roles::Role;

/// User administration: admin only.
pub const USER_ADMIN: &[Role] = &[Role::Admin];

/// Customer create/update.
pub const CUSTOMER_WRITE: &[Role] = &[Role::Admin, Role::SalesManager, Role::SalesRepresentative];

/// Customer read/list/search/filter.
pub const CUSTOMER_READ: &[Role] = &[
    Role::Admin,
    Role::SalesManager,
    Role::SalesRepresentative,
    Role::ReadOnly,
];

/// Customer delete: managers and above.
pub const CUSTOMER_DELETE: &[Role] = &[Role::Admin, Role::SalesManager];

/// The "my customers" view is for the sales staff who own records.
pub const MY_CUSTOMERS: &[Role] = &[Role::SalesManager, Role::SalesRepresentative];

/// Contact create/update/delete.
pub const CONTACT_WRITE: &[Role] = &[Role::Admin, Role::SalesManager, Role::SalesRepresentative];

/// Contact read/list/search/filter.
pub const CONTACT_READ: &[Role] = &[
    Role::Admin,
    Role::SalesManager,
    Role::SalesRepresentative,
    Role::ReadOnly,
];

/// Allow iff the caller's authorities intersect the required set.
pub fn authorize(caller_authorities: &[Role], required: &[Role]) -> bool {
    caller_authorities
        .iter()
        .any(|role| required.contains(role))
}

/// Handler guard: `Forbidden` unless the caller satisfies `required`.
pub fn require(user: &AuthenticatedUser, required: &[Role]) -> Result<(), AuthError> {
    if authorize(&user.roles, required) {
        Ok(())
    } else {
        tracing::debug!(
            username = %user.username,
            required = ?required,
            "access denied: insufficient role"
        );
        Err(AuthError::Forbidden)
    }
}
