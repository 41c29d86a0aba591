//! Project handlers: creation, archival, and the approver/user rosters.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{Project, ProjectStatus};
use adflow_core::validation::validate_name;
use adflow_core::{AppError, Permission};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    pub client_id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RosterRequest {
    pub membership_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_project(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_name("name", &req.name).map_err(HttpAppError)?;
    let client = state
        .gate
        .require_client(&caller, req.client_id, Permission::ProjectManage)
        .await
        .map_err(HttpAppError)?;
    if !client.is_active {
        return Err(HttpAppError(AppError::validation(
            "client_id",
            "client is deactivated",
        )));
    }

    let project: Project = state
        .projects
        .create(client.id, client.agency_id, &req.name)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            project.agency_id,
            "project",
            project.id,
            "project_created",
            &caller,
            None,
            snapshot(&project),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(project))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/archive",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project archived"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 409, description = "Already archived", body = crate::error::ErrorResponse),
    )
)]
pub async fn archive_project(
    caller: Caller,
    Path(project_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .gate
        .require_project(&caller, project_id, Permission::ProjectManage)
        .await
        .map_err(HttpAppError)?;

    let archived = state
        .projects
        .archive(project_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| {
            HttpAppError(AppError::invalid_state(
                "project",
                ProjectStatus::Archived,
                ProjectStatus::Archived,
            ))
        })?;

    state
        .audit
        .record(
            archived.agency_id,
            "project",
            archived.id,
            "project_archived",
            &caller,
            snapshot(&project),
            snapshot(&archived),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(archived))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/approvers",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = RosterRequest,
    responses(
        (status = 200, description = "Approver added"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_approver(
    caller: Caller,
    Path(project_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RosterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .gate
        .require_project(&caller, project_id, Permission::ProjectManage)
        .await
        .map_err(HttpAppError)?;
    ensure_agency_membership(&state, project.agency_id, req.membership_id).await?;

    let approver = state
        .projects
        .add_approver(project_id, req.membership_id)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            project.agency_id,
            "project",
            project.id,
            "project_approver_added",
            &caller,
            None,
            snapshot(&approver),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(approver))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/approvers/{membership_id}",
    tag = "projects",
    params(
        ("id" = Uuid, Path, description = "Project ID"),
        ("membership_id" = Uuid, Path, description = "Membership ID"),
    ),
    responses(
        (status = 204, description = "Approver removed"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn remove_approver(
    caller: Caller,
    Path((project_id, membership_id)): Path<(Uuid, Uuid)>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .gate
        .require_project(&caller, project_id, Permission::ProjectManage)
        .await
        .map_err(HttpAppError)?;

    let removed = state
        .projects
        .remove_approver(project_id, membership_id)
        .await
        .map_err(HttpAppError::from)?;
    if !removed {
        return Err(HttpAppError(AppError::NotFound(
            "Project approver not found".to_string(),
        )));
    }

    state
        .audit
        .record(
            project.agency_id,
            "project",
            project.id,
            "project_approver_removed",
            &caller,
            None,
            None,
            serde_json::json!({ "membership_id": membership_id }),
        )
        .await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/users",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = RosterRequest,
    responses(
        (status = 200, description = "Project user added"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    )
)]
pub async fn add_project_user(
    caller: Caller,
    Path(project_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RosterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let project = state
        .gate
        .require_project(&caller, project_id, Permission::ProjectManage)
        .await
        .map_err(HttpAppError)?;
    ensure_agency_membership(&state, project.agency_id, req.membership_id).await?;

    let user = state
        .projects
        .add_user(project_id, req.membership_id)
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            project.agency_id,
            "project",
            project.id,
            "project_user_added",
            &caller,
            None,
            snapshot(&user),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(user))
}

async fn ensure_agency_membership(
    state: &AppState,
    agency_id: Uuid,
    membership_id: Uuid,
) -> Result<(), HttpAppError> {
    let membership = state
        .memberships
        .get(membership_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Membership not found".to_string())))?;
    if membership.agency_id != agency_id || !membership.is_active {
        return Err(HttpAppError(AppError::validation(
            "membership_id",
            "must be an active membership of the owning agency",
        )));
    }
    Ok(())
}
