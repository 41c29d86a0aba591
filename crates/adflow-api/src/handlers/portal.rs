//! Client-portal handlers. Portal callers authenticate with a contact key
//! and only ever see deliverables of their own client.

use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::auth::models::PortalIdentity;
use crate::error::HttpAppError;
use crate::handlers::deliverables::DeliverableResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/portal/deliverables",
    tag = "portal",
    responses(
        (status = 200, description = "Deliverables awaiting this client's approval", body = Vec<DeliverableResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a portal identity", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_pending_deliverables(
    portal: PortalIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let deliverables = state
        .deliverables
        .list_pending_client_approval(portal.client_id)
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(
        deliverables
            .into_iter()
            .map(DeliverableResponse::from)
            .collect::<Vec<_>>(),
    ))
}
