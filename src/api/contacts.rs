// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact endpoints, nested under a customer.
//!
//! Every operation first checks that the parent customer exists, so a
//! contact can never be reached or created through a dangling customer id.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{policy, Auth};
use crate::error::ApiError;
use crate::models::{Page, PageParams};
use crate::state::AppState;
use crate::storage::{
    CommunicationPreference, ContactRepository, CustomerRepository, NewContact, StoredContact,
};

use super::customers::{resolve_user_id, SearchParams};

/// Contact representation returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactResponse {
    pub id: u64,
    pub customer_id: u64,
    pub name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub communication_preference: CommunicationPreference,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: u64,
}

impl From<StoredContact> for ContactResponse {
    fn from(contact: StoredContact) -> Self {
        Self {
            id: contact.id,
            customer_id: contact.customer_id,
            name: contact.name,
            position: contact.position,
            email: contact.email,
            phone: contact.phone,
            communication_preference: contact.communication_preference,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
            created_by: contact.created_by,
        }
    }
}

/// Request to create a contact.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    pub name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub communication_preference: CommunicationPreference,
}

impl CreateContactRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.len() < 2 || self.name.len() > 100 {
            return Err(ApiError::validation(
                "name: must be between 2 and 100 characters",
            ));
        }
        Ok(())
    }
}

/// Request to update a contact; absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub communication_preference: Option<CommunicationPreference>,
}

fn ensure_customer_exists(state: &AppState, customer_id: u64) -> Result<(), ApiError> {
    if CustomerRepository::new(&state.db).exists(customer_id)? {
        Ok(())
    } else {
        Err(ApiError::not_found(format!(
            "Customer not found with id: {customer_id}"
        )))
    }
}

/// Create a contact for a customer.
#[utoipa::path(
    post,
    path = "/api/v1/customers/{customer_id}/contacts",
    tag = "Contacts",
    security(("bearer" = [])),
    params(("customer_id" = u64, Path, description = "Parent customer id")),
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 404, description = "Customer not found"),
    )
)]
pub async fn create_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    policy::require(&user, policy::CONTACT_WRITE)?;
    request.validate()?;
    ensure_customer_exists(&state, customer_id)?;

    let created_by = resolve_user_id(&state.db, &user.username)?;
    let created = ContactRepository::new(&state.db).create(NewContact {
        customer_id,
        name: request.name,
        position: request.position,
        email: request.email,
        phone: request.phone,
        communication_preference: request.communication_preference,
        created_by,
    })?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a contact.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer" = [])),
    params(
        ("customer_id" = u64, Path, description = "Parent customer id"),
        ("contact_id" = u64, Path, description = "Contact id"),
    ),
    responses(
        (status = 200, description = "Contact found", body = ContactResponse),
        (status = 404, description = "Contact not found"),
    )
)]
pub async fn get_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((customer_id, contact_id)): Path<(u64, u64)>,
) -> Result<Json<ContactResponse>, ApiError> {
    policy::require(&user, policy::CONTACT_READ)?;
    let contact = ContactRepository::new(&state.db).get(customer_id, contact_id)?;
    Ok(Json(contact.into()))
}

/// Update a contact.
#[utoipa::path(
    put,
    path = "/api/v1/customers/{customer_id}/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer" = [])),
    params(
        ("customer_id" = u64, Path, description = "Parent customer id"),
        ("contact_id" = u64, Path, description = "Contact id"),
    ),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 404, description = "Contact not found"),
    )
)]
pub async fn update_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((customer_id, contact_id)): Path<(u64, u64)>,
    Json(request): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    policy::require(&user, policy::CONTACT_WRITE)?;

    let repo = ContactRepository::new(&state.db);
    let mut existing = repo.get(customer_id, contact_id)?;

    if let Some(name) = request.name {
        if name.len() < 2 || name.len() > 100 {
            return Err(ApiError::validation(
                "name: must be between 2 and 100 characters",
            ));
        }
        existing.name = name;
    }
    if let Some(position) = request.position {
        existing.position = Some(position);
    }
    if let Some(email) = request.email {
        existing.email = Some(email);
    }
    if let Some(phone) = request.phone {
        existing.phone = Some(phone);
    }
    if let Some(preference) = request.communication_preference {
        existing.communication_preference = preference;
    }

    let updated = repo.update(&existing)?;
    Ok(Json(updated.into()))
}

/// Delete a contact.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{customer_id}/contacts/{contact_id}",
    tag = "Contacts",
    security(("bearer" = [])),
    params(
        ("customer_id" = u64, Path, description = "Parent customer id"),
        ("contact_id" = u64, Path, description = "Contact id"),
    ),
    responses(
        (status = 204, description = "Contact deleted"),
        (status = 404, description = "Contact not found"),
    )
)]
pub async fn delete_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((customer_id, contact_id)): Path<(u64, u64)>,
) -> Result<StatusCode, ApiError> {
    policy::require(&user, policy::CONTACT_WRITE)?;
    ContactRepository::new(&state.db).delete(customer_id, contact_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a customer's contacts, sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/contacts",
    tag = "Contacts",
    security(("bearer" = [])),
    params(("customer_id" = u64, Path, description = "Parent customer id"), PageParams),
    responses(
        (status = 200, description = "One page of contacts"),
        (status = 404, description = "Customer not found"),
    )
)]
pub async fn list_contacts(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ContactResponse>>, ApiError> {
    policy::require(&user, policy::CONTACT_READ)?;
    ensure_customer_exists(&state, customer_id)?;
    let page = ContactRepository::new(&state.db).list(customer_id, &params)?;
    Ok(Json(page.map(ContactResponse::from)))
}

/// Search a customer's contacts by name, email, or phone.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/contacts/search",
    tag = "Contacts",
    security(("bearer" = [])),
    params(
        ("customer_id" = u64, Path, description = "Parent customer id"),
        SearchParams,
        PageParams,
    ),
    responses((status = 200, description = "Matching contacts")),
)]
pub async fn search_contacts(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(customer_id): Path<u64>,
    Query(search): Query<SearchParams>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ContactResponse>>, ApiError> {
    policy::require(&user, policy::CONTACT_READ)?;
    ensure_customer_exists(&state, customer_id)?;
    let page = ContactRepository::new(&state.db).search(customer_id, &search.query, &params)?;
    Ok(Json(page.map(ContactResponse::from)))
}

/// List a customer's contacts with a given communication preference.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/contacts/by-preference/{preference}",
    tag = "Contacts",
    security(("bearer" = [])),
    params(
        ("customer_id" = u64, Path, description = "Parent customer id"),
        ("preference" = CommunicationPreference, Path, description = "Communication preference"),
        PageParams,
    ),
    responses((status = 200, description = "Contacts with the given preference")),
)]
pub async fn find_by_preference(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path((customer_id, preference)): Path<(u64, CommunicationPreference)>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ContactResponse>>, ApiError> {
    policy::require(&user, policy::CONTACT_READ)?;
    ensure_customer_exists(&state, customer_id)?;
    let page =
        ContactRepository::new(&state.db).find_by_preference(customer_id, preference, &params)?;
    Ok(Json(page.map(ContactResponse::from)))
}
