//! Deliverable lifecycle and review handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{
    Approval, ApprovalDecision, ApprovalTier, Deliverable, DeliverableStatus, DeliverableType,
    DeliverableVersion,
};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateDeliverableRequest {
    pub title: String,
    pub deliverable_type: DeliverableType,
    pub due_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UploadVersionRequest {
    /// Logical file name; version numbers increase per file name.
    pub file_name: String,
    /// Storage key of the uploaded file (upload itself happens elsewhere).
    pub file_key: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ApproveRequest {
    pub version_id: Uuid,
    pub tier: ApprovalTier,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RejectRequest {
    pub version_id: Uuid,
    pub tier: ApprovalTier,
    /// Required: rejections always carry a comment.
    pub comment: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeliverableResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub title: String,
    pub deliverable_type: DeliverableType,
    pub status: DeliverableStatus,
    pub due_on: Option<NaiveDate>,
    pub preview_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deliverable> for DeliverableResponse {
    fn from(d: Deliverable) -> Self {
        DeliverableResponse {
            id: d.id,
            campaign_id: d.campaign_id,
            title: d.title,
            deliverable_type: d.deliverable_type,
            status: d.status,
            due_on: d.due_on,
            preview_version_id: d.preview_version_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeliverableDetailResponse {
    #[serde(flatten)]
    pub deliverable: DeliverableResponse,
    pub versions: Vec<DeliverableVersion>,
    /// Full decision history across all versions, oldest first.
    pub approvals: Vec<Approval>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DecisionResponse {
    pub approval: Approval,
    pub deliverable: DeliverableResponse,
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/deliverables",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = CreateDeliverableRequest,
    responses(
        (status = 200, description = "Deliverable created", body = DeliverableResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 409, description = "Campaign is archived", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_deliverable(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDeliverableRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deliverable = state
        .deliverable_service
        .create_deliverable(
            &caller,
            campaign_id,
            &req.title,
            req.deliverable_type,
            req.due_on,
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(DeliverableResponse::from(deliverable)))
}

#[utoipa::path(
    get,
    path = "/api/v1/deliverables/{id}",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Deliverable ID")),
    responses(
        (status = 200, description = "Deliverable with versions and approval history", body = DeliverableDetailResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_deliverable(
    caller: Caller,
    Path(deliverable_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (deliverable, versions, approvals) = state
        .deliverable_service
        .get_detail(&caller, deliverable_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(DeliverableDetailResponse {
        deliverable: DeliverableResponse::from(deliverable),
        versions,
        approvals,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/deliverables/{id}/versions",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Deliverable ID")),
    request_body = UploadVersionRequest,
    responses(
        (status = 200, description = "Version appended"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 409, description = "Deliverable is approved", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_version(
    caller: Caller,
    Path(deliverable_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UploadVersionRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let version = state
        .deliverable_service
        .upload_version(&caller, deliverable_id, &req.file_name, &req.file_key)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(version))
}

#[utoipa::path(
    post,
    path = "/api/v1/deliverables/{id}/submit-review",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Deliverable ID")),
    responses(
        (status = 200, description = "Deliverable submitted", body = DeliverableResponse),
        (status = 400, description = "No uploaded versions", body = crate::error::ErrorResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_for_review(
    caller: Caller,
    Path(deliverable_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deliverable = state
        .deliverable_service
        .submit_for_review(&caller, deliverable_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(DeliverableResponse::from(deliverable)))
}

#[utoipa::path(
    post,
    path = "/api/v1/deliverables/{id}/approve",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Deliverable ID")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Decision recorded, derived status returned", body = DecisionResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not an approver at this tier", body = crate::error::ErrorResponse),
        (status = 409, description = "Tier does not match current stage", body = crate::error::ErrorResponse),
    )
)]
pub async fn approve_deliverable(
    caller: Caller,
    Path(deliverable_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApproveRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (approval, deliverable) = state
        .deliverable_service
        .decide(
            &caller,
            deliverable_id,
            req.version_id,
            req.tier,
            ApprovalDecision::Approved,
            req.comment.as_deref(),
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(DecisionResponse {
        approval,
        deliverable: DeliverableResponse::from(deliverable),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/deliverables/{id}/reject",
    tag = "deliverables",
    params(("id" = Uuid, Path, description = "Deliverable ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejection recorded, deliverable rejected", body = DecisionResponse),
        (status = 400, description = "Missing comment", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 409, description = "Tier does not match current stage", body = crate::error::ErrorResponse),
    )
)]
pub async fn reject_deliverable(
    caller: Caller,
    Path(deliverable_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RejectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (approval, deliverable) = state
        .deliverable_service
        .decide(
            &caller,
            deliverable_id,
            req.version_id,
            req.tier,
            ApprovalDecision::Rejected,
            Some(req.comment.as_str()),
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(DecisionResponse {
        approval,
        deliverable: DeliverableResponse::from(deliverable),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/deliverables/{id}/versions/{version_id}",
    tag = "deliverables",
    params(
        ("id" = Uuid, Path, description = "Deliverable ID"),
        ("version_id" = Uuid, Path, description = "Version ID"),
    ),
    responses(
        (status = 204, description = "Version deleted"),
        (status = 400, description = "Version referenced by approvals or not the latest", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_version(
    caller: Caller,
    Path((deliverable_id, version_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .deliverable_service
        .delete_version(&caller, deliverable_id, version_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(StatusCode::NO_CONTENT)
}
