//! Client and client-contact handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::Client;
use adflow_core::validation::validate_name;
use adflow_core::{AppError, Permission};

use crate::auth::models::Caller;
use crate::auth::portal_key::{extract_key_prefix, generate_portal_key, hash_portal_key};
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateClientRequest {
    pub name: String,
    pub account_manager_membership_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_approver: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContactResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub email: String,
    pub is_approver: bool,
    pub created_at: DateTime<Utc>,
    /// Portal key, returned once at creation for approver contacts - store
    /// it securely, it won't be shown again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_key: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "clients",
    request_body = CreateClientRequest,
    responses(
        (status = 200, description = "Client created"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_client(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_name("name", &req.name).map_err(HttpAppError)?;
    state
        .gate
        .require_permission(&caller, Permission::ClientManage)
        .map_err(HttpAppError)?;
    let agency_id = caller.agency_id();

    let manager = state
        .memberships
        .get(req.account_manager_membership_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Membership not found".to_string())))?;
    if manager.agency_id != agency_id || !manager.is_active {
        return Err(HttpAppError(AppError::validation(
            "account_manager_membership_id",
            "must be an active membership of the caller's agency",
        )));
    }

    let client: Client = state
        .clients
        .create(agency_id, &req.name, manager.id)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            agency_id,
            "client",
            client.id,
            "client_created",
            &caller,
            None,
            snapshot(&client),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(client))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/deactivate",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deactivated"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn deactivate_client(
    caller: Caller,
    Path(client_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let client = state
        .gate
        .require_client(&caller, client_id, Permission::ClientManage)
        .await
        .map_err(HttpAppError)?;

    let updated = state
        .clients
        .deactivate(client_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Client not found".to_string())))?;

    state
        .audit
        .record(
            updated.agency_id,
            "client",
            updated.id,
            "client_deactivated",
            &caller,
            snapshot(&client),
            snapshot(&updated),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/v1/clients/{id}/contacts",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = CreateContactRequest,
    responses(
        (status = 200, description = "Contact created; approver contacts get a one-time portal key", body = ContactResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_contact(
    caller: Caller,
    Path(client_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_name("name", &req.name).map_err(HttpAppError)?;
    if !req.email.contains('@') {
        return Err(HttpAppError(AppError::validation(
            "email",
            "must be a valid email address",
        )));
    }
    let client = state
        .gate
        .require_client(&caller, client_id, Permission::ClientManage)
        .await
        .map_err(HttpAppError)?;

    // Approver contacts authenticate against the portal; generate their key
    // now and persist only the hash.
    let portal_key = if req.is_approver {
        Some(generate_portal_key())
    } else {
        None
    };
    let (key_hash, key_prefix) = match portal_key.as_deref() {
        Some(key) => (
            Some(hash_portal_key(key).map_err(HttpAppError)?),
            Some(extract_key_prefix(key)),
        ),
        None => (None, None),
    };

    let contact = state
        .clients
        .create_contact(
            client_id,
            client.agency_id,
            &req.name,
            &req.email,
            req.is_approver,
            key_hash.as_deref(),
            key_prefix.as_deref(),
        )
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            client.agency_id,
            "client_contact",
            contact.id,
            "client_contact_created",
            &caller,
            None,
            snapshot(&contact),
            serde_json::json!({ "is_approver": req.is_approver }),
        )
        .await;

    Ok(Json(ContactResponse {
        id: contact.id,
        client_id: contact.client_id,
        name: contact.name,
        email: contact.email,
        is_approver: contact.is_approver,
        created_at: contact.created_at,
        portal_key,
    }))
}
