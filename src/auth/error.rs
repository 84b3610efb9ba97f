// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! All auth failures are terminal and non-retryable: the client must
//! re-authenticate or adjust the request. This module is the single place
//! where internal error kinds map to transport status codes (401 vs 403).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ErrorDetails;

/// Authentication/authorization error type.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token subject does not match the expected identity
    SubjectMismatch,
    /// Bad username/password pair (never says which part was wrong)
    InvalidCredentials,
    /// Identity exists but is disabled
    AccountInactive,
    /// Claims could not be encoded (e.g., empty subject)
    Encoding(String),
    /// Valid identity, insufficient role
    Forbidden,
    /// Internal failure during authentication (fail closed)
    Internal(String),
}

impl AuthError {
    /// Stable machine-readable code, used in logs and tests.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::SubjectMismatch => "subject_mismatch",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountInactive => "account_inactive",
            AuthError::Encoding(_) => "encoding_error",
            AuthError::Forbidden => "forbidden",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::SubjectMismatch
            | AuthError::InvalidCredentials
            | AuthError::AccountInactive => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Encoding(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// User-facing message.
    ///
    /// `InvalidCredentials` and `AccountInactive` intentionally share one
    /// message so responses cannot be used for username enumeration.
    pub fn message(&self) -> String {
        match self {
            AuthError::MissingAuthHeader => "Authorization header is required".to_string(),
            AuthError::InvalidAuthHeader => {
                "Invalid authorization header format (expected 'Bearer <token>')".to_string()
            }
            AuthError::MalformedToken => "Token is malformed".to_string(),
            AuthError::InvalidSignature => "Token signature is invalid".to_string(),
            AuthError::TokenExpired => "Token has expired".to_string(),
            AuthError::SubjectMismatch => "Token subject mismatch".to_string(),
            AuthError::InvalidCredentials | AuthError::AccountInactive => {
                "Invalid username or password".to_string()
            }
            AuthError::Encoding(msg) => format!("Failed to encode token: {msg}"),
            AuthError::Forbidden => "Access denied".to_string(),
            AuthError::Internal(msg) => format!("Internal authentication error: {msg}"),
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ErrorDetails::new(status, crate::error::reason_phrase(status), self.message())
            .into_response()
    }
}
