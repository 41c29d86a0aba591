//! Credit-gated fetch handlers. Both mutations debit one credit before any
//! external work and return a record the caller polls for completion.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{SocialJobType, SocialPlatform};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AnalyticsFetchRequest {
    pub platform: SocialPlatform,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SocialFetchRequest {
    pub platform: SocialPlatform,
    pub job_type: SocialJobType,
}

#[utoipa::path(
    post,
    path = "/api/v1/campaign-creators/{id}/analytics",
    tag = "metering",
    params(("id" = Uuid, Path, description = "Campaign creator ID")),
    request_body = AnalyticsFetchRequest,
    responses(
        (status = 200, description = "Snapshot created; poll it for the payload"),
        (status = 402, description = "Insufficient credits", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn fetch_pre_campaign_analytics(
    caller: Caller,
    Path(campaign_creator_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyticsFetchRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let snapshot = state
        .metering_service
        .fetch_pre_campaign_analytics(&caller, campaign_creator_id, req.platform)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(snapshot))
}

#[utoipa::path(
    post,
    path = "/api/v1/creators/{id}/social-fetch",
    tag = "metering",
    params(("id" = Uuid, Path, description = "Creator ID")),
    request_body = SocialFetchRequest,
    responses(
        (status = 200, description = "Job created; poll it for completion"),
        (status = 402, description = "Insufficient credits", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn trigger_social_fetch(
    caller: Caller,
    Path(creator_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SocialFetchRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let job = state
        .metering_service
        .trigger_social_fetch(&caller, creator_id, req.platform, req.job_type)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(job))
}

#[utoipa::path(
    get,
    path = "/api/v1/social-jobs/{id}",
    tag = "metering",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_social_job(
    caller: Caller,
    Path(job_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let job = state
        .metering_service
        .get_job(&caller, job_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(job))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics-snapshots/{id}",
    tag = "metering",
    params(("id" = Uuid, Path, description = "Snapshot ID")),
    responses(
        (status = 200, description = "Snapshot, payload present once fetched"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_analytics_snapshot(
    caller: Caller,
    Path(snapshot_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let snapshot = state
        .metering_service
        .get_snapshot(&caller, snapshot_id)
        .await
        .map_err(Into::<HttpAppError>::into)?;
    Ok(Json(snapshot))
}
