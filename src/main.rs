// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::path::Path;

use crm_rust_server::api::router;
use crm_rust_server::auth::{gate, Role, TokenService};
use crm_rust_server::config::AppConfig;
use crm_rust_server::state::AppState;
use crm_rust_server::storage::{CrmDatabase, NewUser, UserRepository};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env();

    let db_path = Path::new(&config.data_dir).join("crm.redb");
    let db = CrmDatabase::open(&db_path).expect("Failed to open CRM database");

    if config.dev_mode {
        seed_dev_admin(&db);
    }

    let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.jwt_ttl);
    let state = AppState::new(db, tokens);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("CRM server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

/// Resolve on ctrl-c or SIGTERM so in-flight requests can drain.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}

/// Initialize tracing with `LOG_FORMAT` (json|pretty) and `RUST_LOG`.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Development-mode bootstrap: make sure an `admin` account exists and reset
/// its password to a freshly generated value, logged once at startup.
fn seed_dev_admin(db: &CrmDatabase) {
    let generated: String = uuid::Uuid::new_v4().to_string().chars().take(8).collect();
    let password_hash = gate::hash_password(&generated).expect("Failed to hash admin password");

    let users = UserRepository::new(db);
    match users.find_by_username("admin") {
        Ok(Some(admin)) => {
            users
                .set_password_hash(admin.id, &password_hash)
                .expect("Failed to reset admin password");
        }
        Ok(None) => {
            users
                .create(NewUser {
                    username: "admin".to_string(),
                    email: "admin@example.com".to_string(),
                    password_hash,
                    role: Role::Admin,
                })
                .expect("Failed to create admin user");
        }
        Err(e) => panic!("Failed to look up admin user: {e}"),
    }

    tracing::warn!("=== Development Mode ===");
    tracing::warn!("Generated admin password: {generated}");
    tracing::warn!("========================");
}
