// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT authentication and role-based authorization for the CRM API.
//!
//! ## Auth Flow
//!
//! 1. Client submits credentials to `POST /api/v1/auth/login`
//! 2. [`gate::AuthenticationGate`] verifies them against the stored bcrypt
//!    hash and the account's active flag
//! 3. [`service::TokenService`] issues an HS256 token carrying the subject
//!    and the authority set at that instant
//! 4. Every protected request sends `Authorization: Bearer <token>`;
//!    the [`extractor::Auth`] extractor validates it and binds the identity
//! 5. Handlers check [`policy`] role requirements before touching resources
//!
//! ## Security
//!
//! - Tokens are signed with a single process-wide secret loaded at startup
//! - Tokens are self-contained: validation never touches the store, and
//!   there is no revocation list - expiry is the only termination mechanism
//! - Credential failures never reveal whether the username or the password
//!   was wrong

pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod policy;
pub mod roles;
pub mod service;

pub use claims::{AuthenticatedUser, Claims};
pub use codec::TokenCodec;
pub use error::AuthError;
pub use extractor::Auth;
pub use gate::AuthenticationGate;
pub use roles::Role;
pub use service::TokenService;
