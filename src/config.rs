// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] snapshot loaded from the environment at startup. Configuration
//! is read once and is immutable for the process lifetime.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the embedded database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Shared HS256 signing secret | dev-only placeholder |
//! | `JWT_TTL_SECS` | Token lifetime in seconds | `86400` (24 hours) |
//! | `DEV_MODE` | Seed/reset the admin account at startup | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::time::Duration;

/// Environment variable name for the database directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the JWT signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the token TTL in seconds.
pub const JWT_TTL_SECS_ENV: &str = "JWT_TTL_SECS";

/// Environment variable name enabling development-mode admin seeding.
pub const DEV_MODE_ENV: &str = "DEV_MODE";

/// Placeholder secret for local development.
///
/// Deployments MUST override this via `JWT_SECRET`.
pub const DEFAULT_JWT_SECRET: &str = "default_secret_key_which_should_be_replaced_in_production";

/// Default token lifetime: 24 hours.
pub const DEFAULT_JWT_TTL_SECS: u64 = 86_400;

/// Immutable process-wide configuration snapshot.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the embedded database file.
    pub data_dir: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Shared HS256 signing secret.
    pub jwt_secret: String,
    /// Token lifetime.
    pub jwt_ttl: Duration,
    /// Whether to seed/reset the development admin account at startup.
    pub dev_mode: bool,
}

impl AppConfig {
    /// Load configuration from the environment, applying defaults.
    pub fn from_env() -> Self {
        let jwt_secret =
            env::var(JWT_SECRET_ENV).unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        if jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("JWT_SECRET is unset; using the development placeholder secret");
        }

        let jwt_ttl_secs = env::var(JWT_TTL_SECS_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_JWT_TTL_SECS);

        Self {
            data_dir: env::var(DATA_DIR_ENV).unwrap_or_else(|_| "/data".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            jwt_secret,
            jwt_ttl: Duration::from_secs(jwt_ttl_secs),
            dev_mode: env::var(DEV_MODE_ENV).is_ok_and(|v| v == "1" || v == "true"),
        }
    }
}
