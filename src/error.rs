// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error responses.
//!
//! Every failure rendered to a client uses one body shape:
//! `{timestamp, status, error, message, path}`. The frontend's generic error
//! handling depends on this contract, so it is preserved verbatim.
//!
//! Handlers and extractors construct errors without knowing the request path;
//! [`error_body`] is the single middleware that fills it in before the
//! response leaves the server.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned to clients on every failure.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// When the error was produced.
    pub timestamp: DateTime<Utc>,
    /// HTTP status code.
    pub status: u16,
    /// Status reason phrase ("Unauthorized", "Not Found", ...).
    pub error: String,
    /// Human-readable detail.
    pub message: String,
    /// Request path that produced the error.
    pub path: String,
}

/// Error detail attached to a response as an extension.
///
/// The request path is only known to [`error_body`], which rewrites the
/// response using these details plus the path.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
}

impl ErrorDetails {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    fn body(&self, path: String) -> ErrorResponse {
        ErrorResponse {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            error: self.error.to_string(),
            message: self.message.clone(),
            path,
        }
    }
}

impl IntoResponse for ErrorDetails {
    fn into_response(self) -> Response {
        // Path is unknown at this point; error_body fills it in.
        let mut response = (self.status, Json(self.body(String::new()))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Middleware rewriting error responses with the request path.
///
/// Runs for every request; responses without [`ErrorDetails`] pass through
/// untouched.
pub async fn error_body(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    if let Some(details) = response.extensions_mut().remove::<ErrorDetails>() {
        return (details.status, Json(details.body(path))).into_response();
    }

    response
}

/// Reason phrase used in the `error` field for a status code.
pub(crate) fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::UNAUTHORIZED => "Unauthorized",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::NOT_FOUND => "Not Found",
        _ => "Internal Server Error",
    }
}

/// General API error for the resource handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        ErrorDetails::new(self.status, self.error, self.message).into_response()
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        let status = err.status_code();
        ApiError::new(status, reason_phrase(status), err.message())
    }
}

impl From<crate::storage::StoreError> for ApiError {
    fn from(err: crate::storage::StoreError) -> Self {
        use crate::storage::StoreError;
        match err {
            StoreError::NotFound(what) => ApiError::not_found(what),
            StoreError::AlreadyExists(what) => ApiError::bad_request(what),
            other => {
                tracing::error!(error = %other, "store failure");
                ApiError::internal("An unexpected error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, middleware, routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn constructors_set_status_and_reason() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.error, "Not Found");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let val = ApiError::validation("field: required");
        assert_eq!(val.status, StatusCode::BAD_REQUEST);
        assert_eq!(val.error, "Validation Error");
    }

    #[tokio::test]
    async fn error_body_injects_request_path() {
        let app = Router::new()
            .route(
                "/missing",
                get(|| async { ApiError::not_found("Customer not found with id: 9") }),
            )
            .layer(middleware::from_fn(error_body));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/missing")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "Customer not found with id: 9");
        assert_eq!(body["path"], "/missing");
    }

    #[tokio::test]
    async fn non_error_responses_pass_through() {
        let app = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .layer(middleware::from_fn(error_body));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/ok")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body_bytes[..], b"fine");
    }
}
