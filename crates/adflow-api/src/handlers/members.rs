//! Agency membership handlers.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{AgencyMembership, MemberRole};
use adflow_core::validation::validate_name;
use adflow_core::{AppError, Permission};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddMemberRequest {
    pub email: String,
    pub display_name: String,
    pub role: MemberRole,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    pub role: MemberRole,
}

#[utoipa::path(
    post,
    path = "/api/v1/agencies/{id}/members",
    tag = "members",
    params(("id" = Uuid, Path, description = "Agency ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Membership created"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_member(
    caller: Caller,
    Path(agency_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .gate
        .require_agency(&caller, agency_id, Permission::MemberManage)
        .map_err(HttpAppError)?;
    validate_name("display_name", &req.display_name).map_err(HttpAppError)?;
    if !req.email.contains('@') {
        return Err(HttpAppError(AppError::validation(
            "email",
            "must be a valid email address",
        )));
    }

    let user = match state
        .users
        .get_by_email(&req.email)
        .await
        .map_err(HttpAppError::from)?
    {
        Some(user) => user,
        None => state
            .users
            .create(&req.email, &req.display_name)
            .await
            .map_err(HttpAppError::from)?,
    };

    let membership: AgencyMembership = state
        .memberships
        .create(agency_id, user.id, req.role)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            agency_id,
            "membership",
            membership.id,
            "membership_created",
            &caller,
            None,
            snapshot(&membership),
            serde_json::json!({ "role": req.role }),
        )
        .await;
    Ok(Json(membership))
}

#[utoipa::path(
    put,
    path = "/api/v1/members/{id}/role",
    tag = "members",
    params(("id" = Uuid, Path, description = "Membership ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn set_member_role(
    caller: Caller,
    Path(membership_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetRoleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let membership = state
        .memberships
        .get(membership_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Membership not found".to_string())))?;
    state
        .gate
        .require_agency(&caller, membership.agency_id, Permission::MemberManage)
        .map_err(HttpAppError)?;

    let updated = state
        .memberships
        .set_role(membership_id, req.role)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Membership not found".to_string())))?;

    state
        .audit
        .record(
            updated.agency_id,
            "membership",
            updated.id,
            "membership_role_changed",
            &caller,
            snapshot(&membership),
            snapshot(&updated),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(updated))
}
