// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints (admin only) plus `/users/me`.
//!
//! The auth core only ever reads user rows; every write to roles, status,
//! or credentials goes through these handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{gate, policy, Auth, AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::models::{Page, PageParams};
use crate::state::AppState;
use crate::storage::{NewUser, StoredUser, UserRepository, UserStatus};

/// User representation returned to clients. Never carries the hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request to create a user.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.username.len() < 3 || self.username.len() > 50 {
            return Err(ApiError::validation(
                "username: must be between 3 and 50 characters",
            ));
        }
        if !self
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(ApiError::validation(
                "username: can only contain letters, numbers, dots, underscores and hyphens",
            ));
        }
        validate_email(&self.email)?;
        if self.password.len() < 8 {
            return Err(ApiError::validation(
                "password: must be at least 8 characters long",
            ));
        }
        Ok(())
    }
}

/// Request to update a user. Username is immutable.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(ApiError::validation("email: invalid email format"))
    }
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation failed or duplicate username/email"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Requires the ADMIN role"),
    )
)]
pub async fn create_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    request.validate()?;

    let password_hash = gate::hash_password(&request.password)?;
    let created = UserRepository::new(&state.db).create(NewUser {
        username: request.username,
        email: request.email,
        password_hash,
        role: request.role,
    })?;

    tracing::info!(username = %created.username, role = %created.role, "user created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
pub async fn get_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    let found = UserRepository::new(&state.db).get(id)?;
    Ok(Json(found.into()))
}

/// Update a user's email, role, or status.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
pub async fn update_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;

    let repo = UserRepository::new(&state.db);
    let mut existing = repo.get(id)?;

    if let Some(email) = request.email {
        validate_email(&email)?;
        existing.email = email;
    }
    if let Some(role) = request.role {
        existing.role = role;
    }
    if let Some(status) = request.status {
        // Already-issued tokens stay valid until expiry; deactivation only
        // blocks new logins.
        existing.status = status;
    }

    let updated = repo.update(&existing)?;
    Ok(Json(updated.into()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
    )
)]
pub async fn delete_user(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    UserRepository::new(&state.db).delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List users, sorted by username.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    params(PageParams),
    responses(
        (status = 200, description = "One page of users"),
    )
)]
pub async fn list_users(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    let page = UserRepository::new(&state.db).list(&params)?;
    Ok(Json(page.map(UserResponse::from)))
}

/// Look up a user by username (exact, case-sensitive).
#[utoipa::path(
    get,
    path = "/api/v1/users/by-username/{username}",
    tag = "Users",
    security(("bearer" = [])),
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
pub async fn find_by_username(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    let found = UserRepository::new(&state.db)
        .find_by_username(&username)?
        .ok_or_else(|| ApiError::not_found(format!("User not found with username: {username}")))?;
    Ok(Json(found.into()))
}

/// Look up a user by email.
#[utoipa::path(
    get,
    path = "/api/v1/users/by-email/{email}",
    tag = "Users",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Email address")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
pub async fn find_by_email(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    policy::require(&user, policy::USER_ADMIN)?;
    let found = UserRepository::new(&state.db)
        .find_by_email(&email)?
        .ok_or_else(|| ApiError::not_found(format!("User not found with email: {email}")))?;
    Ok(Json(found.into()))
}

/// Response for GET /api/v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Username from the presented token
    pub username: String,
    /// Roles granted at token issuance
    pub roles: Vec<Role>,
}

impl From<AuthenticatedUser> for UserMeResponse {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            username: user.username,
            roles: user.roles,
        }
    }
}

/// Get the current authenticated user's identity and roles.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current identity", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(Auth(user): Auth) -> Json<UserMeResponse> {
    Json(user.into())
}
