//! Creator roster handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;

use adflow_core::validation::validate_name;
use adflow_core::Permission;

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCreatorRequest {
    pub display_name: String,
    pub handle: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/creators",
    tag = "creators",
    request_body = CreateCreatorRequest,
    responses(
        (status = 200, description = "Creator created"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_creator(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCreatorRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_name("display_name", &req.display_name).map_err(HttpAppError)?;
    state
        .gate
        .require_permission(&caller, Permission::CampaignManage)
        .map_err(HttpAppError)?;

    let creator = state
        .creators
        .create(caller.agency_id(), &req.display_name, req.handle.as_deref())
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            creator.agency_id,
            "creator",
            creator.id,
            "creator_created",
            &caller,
            None,
            snapshot(&creator),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(creator))
}
