// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthError, AuthenticationGate};
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username (case-sensitive)
    pub username: String,
    /// Plaintext password; verified against the stored hash, never persisted
    pub password: String,
}

/// Login response containing the issued token.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Authenticate a user and return a JWT token.
///
/// All credential failures - unknown username, wrong password, inactive
/// account - surface as the same 401 body.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successfully authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let gate = AuthenticationGate::new(&state.db, &state.tokens);
    let token = gate.login(&request.username, &request.password)?;

    tracing::info!(username = %request.username, "login succeeded");
    Ok(Json(LoginResponse { token }))
}
