// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CRM Server - Customer Relationship Management Backend
//!
//! This crate provides the REST backend for the CRM admin frontend:
//! users, customers, and contacts over an embedded store, guarded by a JWT
//! authentication/authorization core.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and authorization (JWT, roles, policy)
//! - `storage` - Embedded database and repositories (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
