// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::error_body, state::AppState};

pub mod auth;
pub mod contacts;
pub mod customers;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    // Protected resources. The route table is the single place deciding
    // which operations require authentication; role requirements live in
    // crate::auth::policy and are checked inside each handler.
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route(
            "/users",
            post(users::create_user).get(users::list_users),
        )
        .route("/users/me", get(users::me))
        .route("/users/by-username/{username}", get(users::find_by_username))
        .route("/users/by-email/{email}", get(users::find_by_email))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/customers",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route("/customers/search", get(customers::search_customers))
        .route("/customers/by-status/{status}", get(customers::find_by_status))
        .route(
            "/customers/by-category/{category}",
            get(customers::find_by_category),
        )
        .route("/customers/my-customers", get(customers::find_my_customers))
        .route(
            "/customers/{customer_id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/customers/{customer_id}/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route(
            "/customers/{customer_id}/contacts/search",
            get(contacts::search_contacts),
        )
        .route(
            "/customers/{customer_id}/contacts/by-preference/{preference}",
            get(contacts::find_by_preference),
        )
        .route(
            "/customers/{customer_id}/contacts/{contact_id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .delete(contacts::delete_contact),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(error_body))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::list_users,
        users::find_by_username,
        users::find_by_email,
        users::me,
        customers::create_customer,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::list_customers,
        customers::search_customers,
        customers::find_by_status,
        customers::find_by_category,
        customers::find_my_customers,
        contacts::create_contact,
        contacts::get_contact,
        contacts::update_contact,
        contacts::delete_contact,
        contacts::list_contacts,
        contacts::search_contacts,
        contacts::find_by_preference,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::LoginResponse,
            users::UserResponse,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::UserMeResponse,
            customers::CustomerResponse,
            customers::CreateCustomerRequest,
            customers::UpdateCustomerRequest,
            contacts::ContactResponse,
            contacts::CreateContactRequest,
            contacts::UpdateContactRequest,
            crate::auth::Role,
            crate::storage::UserStatus,
            crate::storage::CustomerStatus,
            crate::storage::CustomerCategory,
            crate::storage::CommunicationPreference,
            crate::error::ErrorResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Authentication", description = "Credential-to-token exchange"),
        (name = "Users", description = "User administration"),
        (name = "Customers", description = "Customer management"),
        (name = "Contacts", description = "Customer contact management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{gate, Claims, Role, TokenService};
    use crate::storage::{CrmDatabase, NewUser, UserRepository, UserStatus};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"router-test-secret";

    struct TestApp {
        router: Router,
        state: AppState,
        _temp_dir: TempDir,
    }

    fn test_app() -> TestApp {
        let temp_dir = TempDir::new().unwrap();
        let db = CrmDatabase::open(&temp_dir.path().join("crm.redb")).unwrap();
        let tokens = TokenService::new(SECRET, Duration::from_secs(3600));
        let state = AppState::new(db, tokens);
        TestApp {
            router: router(state.clone()),
            state,
            _temp_dir: temp_dir,
        }
    }

    fn seed_user(state: &AppState, username: &str, password: &str, role: Role) {
        UserRepository::new(&state.db)
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: gate::hash_password(password).unwrap(),
                role,
            })
            .unwrap();
    }

    fn token_for(state: &AppState, username: &str, role: Role) -> String {
        state.tokens.issue(username, &[role]).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&value).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn login_returns_token_with_issuance_time_authorities() {
        let app = test_app();
        seed_user(&app.state, "admin", "s3cret-pass", Role::Admin);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "admin", "password": "s3cret-pass"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap();

        let claims = app.state.tokens.validate(token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.authorities, vec![Role::Admin]);
    }

    #[tokio::test]
    async fn login_failure_has_contract_error_body() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "ghost", "password": "whatever"})),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["status"], 401);
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(body["message"], "Invalid username or password");
        assert_eq!(body["path"], "/api/v1/auth/login");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn deactivation_blocks_login_but_not_issued_tokens() {
        let app = test_app();
        seed_user(&app.state, "jdoe", "s3cret-pass", Role::SalesManager);

        // Login once while active.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "jdoe", "password": "s3cret-pass"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = body_json(response).await["token"].as_str().unwrap().to_string();

        // Deactivate the account.
        let users = UserRepository::new(&app.state.db);
        let mut user = users.find_by_username("jdoe").unwrap().unwrap();
        user.status = UserStatus::Inactive;
        users.update(&user).unwrap();

        // New login fails with the generic 401.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "jdoe", "password": "s3cret-pass"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // The earlier token remains valid until natural expiry (documented
        // non-revocation behavior).
        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/users/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_401_on_protected_routes() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/customers", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["path"], "/api/v1/customers");
    }

    #[tokio::test]
    async fn expired_token_is_401_distinct_from_malformed() {
        let app = test_app();

        // Token issued two TTLs in the past.
        let now = Utc::now().timestamp();
        let expired = app
            .state
            .tokens
            .codec()
            .encode(&Claims {
                sub: "jdoe".to_string(),
                authorities: vec![Role::Admin],
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/customers", Some(&expired), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let expired_body = body_json(response).await;
        assert_eq!(expired_body["message"], "Token has expired");

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "GET",
                "/api/v1/customers",
                Some("garbage-token"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let malformed_body = body_json(response).await;
        assert_ne!(expired_body["message"], malformed_body["message"]);
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let app = test_app();
        let token = token_for(&app.state, "jdoe", Role::Admin);

        // Flip one character in the payload segment.
        let parts: Vec<&str> = token.split('.').collect();
        let mut payload = parts[1].to_string();
        let flipped = if payload.ends_with('A') { "B" } else { "A" };
        payload.replace_range(payload.len() - 1.., flipped);
        let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);

        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/customers", Some(&tampered), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn representative_is_forbidden_from_admin_routes_but_not_shared_ones() {
        let app = test_app();
        seed_user(&app.state, "rep", "s3cret-pass", Role::SalesRepresentative);
        let token = token_for(&app.state, "rep", Role::SalesRepresentative);

        // {SALES_REPRESENTATIVE} against {ADMIN}: 403.
        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/users", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Forbidden");
        assert_eq!(body["path"], "/api/v1/users");

        // Same token against {ADMIN, SALES_MANAGER, SALES_REPRESENTATIVE}: 201.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/customers",
                Some(&token),
                Some(serde_json::json!({
                    "name": "Acme",
                    "company": "Acme Corp",
                    "category": "REGULAR"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn read_only_role_cannot_write_customers() {
        let app = test_app();
        seed_user(&app.state, "viewer", "s3cret-pass", Role::ReadOnly);
        let token = token_for(&app.state, "viewer", Role::ReadOnly);

        let response = app
            .router
            .clone()
            .oneshot(json_request("GET", "/api/v1/customers", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/customers",
                Some(&token),
                Some(serde_json::json!({
                    "name": "Acme",
                    "company": "Acme Corp",
                    "category": "REGULAR"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn representative_cannot_delete_customers() {
        let app = test_app();
        seed_user(&app.state, "admin", "s3cret-pass", Role::Admin);
        seed_user(&app.state, "rep", "s3cret-pass", Role::SalesRepresentative);

        let admin_token = token_for(&app.state, "admin", Role::Admin);
        let rep_token = token_for(&app.state, "rep", Role::SalesRepresentative);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/customers",
                Some(&admin_token),
                Some(serde_json::json!({
                    "name": "Acme",
                    "company": "Acme Corp",
                    "category": "PREMIUM"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let customer_id = body_json(response).await["id"].as_u64().unwrap();

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "DELETE",
                &format!("/api/v1/customers/{customer_id}"),
                Some(&rep_token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "DELETE",
                &format!("/api/v1/customers/{customer_id}"),
                Some(&admin_token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn user_admin_crud_via_api() {
        let app = test_app();
        seed_user(&app.state, "admin", "s3cret-pass", Role::Admin);
        let token = token_for(&app.state, "admin", Role::Admin);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/users",
                Some(&token),
                Some(serde_json::json!({
                    "username": "newrep",
                    "email": "newrep@example.com",
                    "password": "long-enough",
                    "role": "SALES_REPRESENTATIVE"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["username"], "newrep");
        assert_eq!(created["role"], "SALES_REPRESENTATIVE");
        assert_eq!(created["status"], "ACTIVE");
        let id = created["id"].as_u64().unwrap();

        // The new user can log in immediately.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "newrep", "password": "long-enough"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Deactivate through the API.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/v1/users/{id}"),
                Some(&token),
                Some(serde_json::json!({"status": "INACTIVE"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "newrep", "password": "long-enough"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "DELETE",
                &format!("/api/v1/users/{id}"),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn contacts_are_scoped_under_customers() {
        let app = test_app();
        seed_user(&app.state, "rep", "s3cret-pass", Role::SalesRepresentative);
        let token = token_for(&app.state, "rep", Role::SalesRepresentative);

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/customers",
                Some(&token),
                Some(serde_json::json!({
                    "name": "Acme",
                    "company": "Acme Corp",
                    "category": "REGULAR"
                })),
            ))
            .await
            .unwrap();
        let customer_id = body_json(response).await["id"].as_u64().unwrap();

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/customers/{customer_id}/contacts"),
                Some(&token),
                Some(serde_json::json!({
                    "name": "Ada",
                    "communication_preference": "EMAIL"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let contact_id = body_json(response).await["id"].as_u64().unwrap();

        // Reachable under its own customer.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "GET",
                &format!("/api/v1/customers/{customer_id}/contacts/{contact_id}"),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Creating a contact under a missing customer is 404.
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/customers/999/contacts",
                Some(&token),
                Some(serde_json::json!({
                    "name": "Grace",
                    "communication_preference": "PHONE"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn my_customers_filters_by_creator() {
        let app = test_app();
        seed_user(&app.state, "rep", "s3cret-pass", Role::SalesRepresentative);
        seed_user(&app.state, "manager", "s3cret-pass", Role::SalesManager);

        let rep_token = token_for(&app.state, "rep", Role::SalesRepresentative);
        let manager_token = token_for(&app.state, "manager", Role::SalesManager);

        for (token, name) in [(&rep_token, "RepCo"), (&manager_token, "MgrCo")] {
            let response = app
                .router
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/v1/customers",
                    Some(token),
                    Some(serde_json::json!({
                        "name": name,
                        "company": format!("{name} Inc"),
                        "category": "REGULAR"
                    })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "GET",
                "/api/v1/customers/my-customers",
                Some(&rep_token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total_elements"], 1);
        assert_eq!(body["content"][0]["name"], "RepCo");
    }

    #[tokio::test]
    async fn health_routes_are_anonymous() {
        let app = test_app();

        for uri in ["/health", "/health/live", "/health/ready"] {
            let response = app
                .router
                .clone()
                .oneshot(json_request("GET", uri, None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }
}
