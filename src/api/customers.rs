// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Customer endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{policy, Auth, AuthError};
use crate::error::ApiError;
use crate::models::{Page, PageParams};
use crate::state::AppState;
use crate::storage::{
    CrmDatabase, CustomerCategory, CustomerRepository, CustomerStatus, NewCustomer, StoredCustomer,
    UserRepository,
};

/// Customer representation returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: u64,
    pub name: String,
    pub company: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: CustomerStatus,
    pub category: CustomerCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: u64,
}

impl From<StoredCustomer> for CustomerResponse {
    fn from(customer: StoredCustomer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            company: customer.company,
            title: customer.title,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            status: customer.status,
            category: customer.category,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
            created_by: customer.created_by,
        }
    }
}

/// Request to create a customer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub company: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub category: CustomerCategory,
}

impl CreateCustomerRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name("name", &self.name)?;
        validate_name("company", &self.company)?;
        Ok(())
    }
}

/// Request to update a customer; absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<CustomerStatus>,
    pub category: Option<CustomerCategory>,
}

fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    if value.len() < 2 || value.len() > 100 {
        return Err(ApiError::validation(format!(
            "{field}: must be between 2 and 100 characters"
        )));
    }
    Ok(())
}

/// Search query parameter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    pub query: String,
}

/// Resolve the caller's stored numeric id from the token subject.
///
/// Fails closed with 401 if the identity no longer exists - a valid token
/// whose subject has been deleted must not fall through to business logic.
pub(crate) fn resolve_user_id(db: &CrmDatabase, username: &str) -> Result<u64, ApiError> {
    UserRepository::new(db)
        .find_by_username(username)
        .map_err(ApiError::from)?
        .map(|user| user.id)
        .ok_or_else(|| ApiError::from(AuthError::InvalidCredentials))
}

/// Create a customer. The caller becomes `created_by`.
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "Customers",
    security(("bearer" = [])),
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Insufficient role"),
    )
)]
pub async fn create_customer(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    policy::require(&user, policy::CUSTOMER_WRITE)?;
    request.validate()?;

    let created_by = resolve_user_id(&state.db, &user.username)?;
    let created = CustomerRepository::new(&state.db).create(NewCustomer {
        name: request.name,
        company: request.company,
        title: request.title,
        email: request.email,
        phone: request.phone,
        address: request.address,
        category: request.category,
        created_by,
    })?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a customer by id.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}",
    tag = "Customers",
    security(("bearer" = [])),
    params(("customer_id" = u64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
    )
)]
pub async fn get_customer(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
) -> Result<Json<CustomerResponse>, ApiError> {
    policy::require(&user, policy::CUSTOMER_READ)?;
    let customer = CustomerRepository::new(&state.db).get(customer_id)?;
    Ok(Json(customer.into()))
}

/// Update a customer.
#[utoipa::path(
    put,
    path = "/api/v1/customers/{customer_id}",
    tag = "Customers",
    security(("bearer" = [])),
    params(("customer_id" = u64, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 404, description = "Customer not found"),
    )
)]
pub async fn update_customer(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Json<CustomerResponse>, ApiError> {
    policy::require(&user, policy::CUSTOMER_WRITE)?;

    let repo = CustomerRepository::new(&state.db);
    let mut existing = repo.get(customer_id)?;

    if let Some(name) = request.name {
        validate_name("name", &name)?;
        existing.name = name;
    }
    if let Some(company) = request.company {
        validate_name("company", &company)?;
        existing.company = company;
    }
    if let Some(title) = request.title {
        existing.title = Some(title);
    }
    if let Some(email) = request.email {
        existing.email = Some(email);
    }
    if let Some(phone) = request.phone {
        existing.phone = Some(phone);
    }
    if let Some(address) = request.address {
        existing.address = Some(address);
    }
    if let Some(status) = request.status {
        existing.status = status;
    }
    if let Some(category) = request.category {
        existing.category = category;
    }

    let updated = repo.update(&existing)?;
    Ok(Json(updated.into()))
}

/// Delete a customer.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{customer_id}",
    tag = "Customers",
    security(("bearer" = [])),
    params(("customer_id" = u64, Path, description = "Customer id")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 403, description = "Requires ADMIN or SALES_MANAGER"),
        (status = 404, description = "Customer not found"),
    )
)]
pub async fn delete_customer(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    policy::require(&user, policy::CUSTOMER_DELETE)?;
    CustomerRepository::new(&state.db).delete(customer_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List customers, sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    security(("bearer" = [])),
    params(PageParams),
    responses((status = 200, description = "One page of customers")),
)]
pub async fn list_customers(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CustomerResponse>>, ApiError> {
    policy::require(&user, policy::CUSTOMER_READ)?;
    let page = CustomerRepository::new(&state.db).list(&params)?;
    Ok(Json(page.map(CustomerResponse::from)))
}

/// Search customers by name, company, or email.
#[utoipa::path(
    get,
    path = "/api/v1/customers/search",
    tag = "Customers",
    security(("bearer" = [])),
    params(SearchParams, PageParams),
    responses((status = 200, description = "Matching customers")),
)]
pub async fn search_customers(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(search): Query<SearchParams>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CustomerResponse>>, ApiError> {
    policy::require(&user, policy::CUSTOMER_READ)?;
    let page = CustomerRepository::new(&state.db).search(&search.query, &params)?;
    Ok(Json(page.map(CustomerResponse::from)))
}

/// List customers with a given status.
#[utoipa::path(
    get,
    path = "/api/v1/customers/by-status/{status}",
    tag = "Customers",
    security(("bearer" = [])),
    params(
        ("status" = CustomerStatus, Path, description = "Customer status"),
        PageParams,
    ),
    responses((status = 200, description = "Customers with the given status")),
)]
pub async fn find_by_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(status): Path<CustomerStatus>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CustomerResponse>>, ApiError> {
    policy::require(&user, policy::CUSTOMER_READ)?;
    let page = CustomerRepository::new(&state.db).find_by_status(status, &params)?;
    Ok(Json(page.map(CustomerResponse::from)))
}

/// List customers in a given category.
#[utoipa::path(
    get,
    path = "/api/v1/customers/by-category/{category}",
    tag = "Customers",
    security(("bearer" = [])),
    params(
        ("category" = CustomerCategory, Path, description = "Customer category"),
        PageParams,
    ),
    responses((status = 200, description = "Customers in the given category")),
)]
pub async fn find_by_category(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(category): Path<CustomerCategory>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CustomerResponse>>, ApiError> {
    policy::require(&user, policy::CUSTOMER_READ)?;
    let page = CustomerRepository::new(&state.db).find_by_category(category, &params)?;
    Ok(Json(page.map(CustomerResponse::from)))
}

/// List the customers created by the calling user.
#[utoipa::path(
    get,
    path = "/api/v1/customers/my-customers",
    tag = "Customers",
    security(("bearer" = [])),
    params(PageParams),
    responses((status = 200, description = "Customers created by the caller")),
)]
pub async fn find_my_customers(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CustomerResponse>>, ApiError> {
    policy::require(&user, policy::MY_CUSTOMERS)?;
    let user_id = resolve_user_id(&state.db, &user.username)?;
    let page = CustomerRepository::new(&state.db).find_by_created_by(user_id, &params)?;
    Ok(Json(page.map(CustomerResponse::from)))
}
