//! Campaign lifecycle handlers.

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
    Campaign, CampaignMember, CampaignRole, CampaignStatus, CampaignType,
};
use adflow_core::{AppError, Permission};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub campaign_type: CampaignType,
    /// User ids granted the campaign approver role. At least one required.
    pub approver_user_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateDetailsRequest {
    pub name: Option<String>,
    pub campaign_type: Option<CampaignType>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetDatesRequest {
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateBriefRequest {
    pub brief: Option<String>,
    pub attachments: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignMemberRequest {
    pub membership_id: Uuid,
    pub role: CampaignRole,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AssignCreatorRequest {
    pub creator_id: Uuid,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub campaign_type: CampaignType,
    pub status: CampaignStatus,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub brief: Option<String>,
    pub attachments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(c: Campaign) -> Self {
        CampaignResponse {
            id: c.id,
            project_id: c.project_id,
            name: c.name,
            campaign_type: c.campaign_type,
            status: c.status,
            starts_on: c.starts_on,
            ends_on: c.ends_on,
            brief: c.brief,
            attachments: c.attachments,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CampaignDetailResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub members: Vec<CampaignMember>,
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/campaigns",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = CreateCampaignRequest,
    responses(
        (status = 200, description = "Campaign created in draft", body = CampaignResponse),
        (status = 400, description = "Invalid request (e.g. empty approver list)", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_campaign(
    caller: Caller,
    Path(project_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .campaign_service
        .create_campaign(
            &caller,
            project_id,
            &req.name,
            req.campaign_type,
            &req.approver_user_ids,
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(CampaignResponse::from(campaign)))
}

#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign with member roster", body = CampaignDetailResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_campaign(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .gate
        .require_campaign(&caller, campaign_id, Permission::CampaignView)
        .await
        .map_err(HttpAppError)?;
    let members = state
        .campaigns
        .list_members(campaign_id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(CampaignDetailResponse {
        campaign: CampaignResponse::from(campaign),
        members,
    }))
}

async fn run_transition(
    state: &AppState,
    caller: &Caller,
    campaign_id: Uuid,
    target: CampaignStatus,
    action: &str,
) -> Result<Json<CampaignResponse>, HttpAppError> {
    let campaign = state
        .campaign_service
        .transition(caller, campaign_id, target, action)
        .await
        .map_err(HttpAppError)?;
    Ok(Json(CampaignResponse::from(campaign)))
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/activate",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign activated", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn activate_campaign(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::Active,
        "campaign_activated",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/submit-review",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign submitted for review", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_campaign_for_review(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::InReview,
        "campaign_submitted_for_review",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/approve",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign approved", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn approve_campaign(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::Approved,
        "campaign_approved",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/reject",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Review rejected, campaign back to active", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn reject_campaign_review(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::Active,
        "campaign_review_rejected",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/complete",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign completed", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn complete_campaign(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::Completed,
        "campaign_completed",
    )
    .await
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/archive",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign archived (terminal)", body = CampaignResponse),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn archive_campaign(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    run_transition(
        &state,
        &caller,
        campaign_id,
        CampaignStatus::Archived,
        "campaign_archived",
    )
    .await
}

#[utoipa::path(
    patch,
    path = "/api/v1/campaigns/{id}/details",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = UpdateDetailsRequest,
    responses(
        (status = 200, description = "Details updated", body = CampaignResponse),
        (status = 409, description = "Campaign is archived", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_campaign_details(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateDetailsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .campaign_service
        .update_details(
            &caller,
            campaign_id,
            req.name.as_deref(),
            req.campaign_type,
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(CampaignResponse::from(campaign)))
}

#[utoipa::path(
    put,
    path = "/api/v1/campaigns/{id}/dates",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = SetDatesRequest,
    responses(
        (status = 200, description = "Dates set", body = CampaignResponse),
        (status = 400, description = "Invalid date order", body = crate::error::ErrorResponse),
        (status = 409, description = "Campaign is archived", body = crate::error::ErrorResponse),
    )
)]
pub async fn set_campaign_dates(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetDatesRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .campaign_service
        .set_dates(&caller, campaign_id, req.starts_on, req.ends_on)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(CampaignResponse::from(campaign)))
}

#[utoipa::path(
    put,
    path = "/api/v1/campaigns/{id}/brief",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = UpdateBriefRequest,
    responses(
        (status = 200, description = "Brief updated", body = CampaignResponse),
        (status = 409, description = "Campaign is archived", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_campaign_brief(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateBriefRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .campaign_service
        .update_brief(
            &caller,
            campaign_id,
            req.brief.as_deref(),
            req.attachments.as_ref(),
        )
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(CampaignResponse::from(campaign)))
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/members",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = AssignMemberRequest,
    responses(
        (status = 200, description = "Member assigned"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn assign_campaign_member(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let member = state
        .campaign_service
        .assign_user(&caller, campaign_id, req.membership_id, req.role)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(member))
}

#[utoipa::path(
    delete,
    path = "/api/v1/campaigns/{id}/members/{membership_id}",
    tag = "campaigns",
    params(
        ("id" = Uuid, Path, description = "Campaign ID"),
        ("membership_id" = Uuid, Path, description = "Membership ID"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Would leave campaign without an approver", body = crate::error::ErrorResponse),
    )
)]
pub async fn remove_campaign_member(
    caller: Caller,
    Path((campaign_id, membership_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .campaign_service
        .remove_user(&caller, campaign_id, membership_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/creators",
    tag = "campaigns",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = AssignCreatorRequest,
    responses(
        (status = 200, description = "Creator assigned to campaign"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn assign_creator(
    caller: Caller,
    Path(campaign_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignCreatorRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let campaign = state
        .gate
        .require_campaign(&caller, campaign_id, Permission::CampaignManage)
        .await
        .map_err(HttpAppError)?;

    let creator = state
        .creators
        .get(req.creator_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Creator not found".to_string())))?;
    if creator.agency_id != campaign.agency_id {
        return Err(HttpAppError(AppError::NotFound(
            "Creator not found".to_string(),
        )));
    }

    let assignment = state
        .creators
        .assign_to_campaign(campaign_id, creator.id, campaign.agency_id)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            campaign.agency_id,
            "campaign_creator",
            assignment.id,
            "creator_assigned_to_campaign",
            &caller,
            None,
            snapshot(&assignment),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(assignment))
}
