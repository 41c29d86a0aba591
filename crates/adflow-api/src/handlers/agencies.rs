//! Agency signup, email configuration, and audit trail handlers.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{ActivityLogEntry, Agency, AgencyStatus, MemberRole};
use adflow_core::validation::validate_name;
use adflow_core::{AppError, Permission};

use crate::auth::jwt::issue_token;
use crate::auth::models::{Caller, MemberIdentity};
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateAgencyRequest {
    pub name: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    pub admin_email: String,
    pub admin_display_name: String,
}

fn default_locale() -> String {
    "en".to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AgencyResponse {
    pub id: Uuid,
    pub name: String,
    pub status: AgencyStatus,
    pub token_balance: i64,
    pub locale: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl From<Agency> for AgencyResponse {
    fn from(a: Agency) -> Self {
        AgencyResponse {
            id: a.id,
            name: a.name,
            status: a.status,
            token_balance: a.token_balance,
            locale: a.locale,
            timezone: a.timezone,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CreateAgencyResponse {
    pub agency: AgencyResponse,
    pub membership_id: Uuid,
    pub user_id: Uuid,
    /// Bearer token for the admin user - store it securely.
    pub token: String,
}

/// Email configuration with secrets stripped.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EmailConfigResponse {
    pub agency_id: Uuid,
    pub from_name: String,
    pub from_email: String,
    pub reply_to: Option<String>,
    pub smtp_host: String,
    pub smtp_port: i32,
    pub smtp_username: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/agencies",
    tag = "agencies",
    request_body = CreateAgencyRequest,
    responses(
        (status = 200, description = "Agency created", body = CreateAgencyResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_agency(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAgencyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_name("name", &req.name).map_err(HttpAppError)?;
    validate_name("admin_display_name", &req.admin_display_name).map_err(HttpAppError)?;
    if !req.admin_email.contains('@') {
        return Err(HttpAppError(AppError::validation(
            "admin_email",
            "must be a valid email address",
        )));
    }

    let user = match state
        .users
        .get_by_email(&req.admin_email)
        .await
        .map_err(AppError::from)
        .map_err(HttpAppError)?
    {
        Some(user) => user,
        None => state
            .users
            .create(&req.admin_email, &req.admin_display_name)
            .await
            .map_err(AppError::from)
            .map_err(HttpAppError)?,
    };

    let agency = state
        .agencies
        .create(
            &req.name,
            &req.locale,
            &req.timezone,
            state.config.signup_token_grant,
        )
        .await
        .map_err(AppError::from)
        .map_err(HttpAppError)?;

    let membership = state
        .memberships
        .create(agency.id, user.id, MemberRole::Admin)
        .await
        .map_err(AppError::from)
        .map_err(HttpAppError)?;

    let token = issue_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )
    .map_err(HttpAppError)?;

    let caller = Caller::Member(MemberIdentity {
        user_id: user.id,
        membership_id: membership.id,
        agency_id: agency.id,
        role: MemberRole::Admin,
    });
    state
        .audit
        .record(
            agency.id,
            "agency",
            agency.id,
            "agency_created",
            &caller,
            None,
            snapshot(&agency),
            serde_json::json!({ "token_grant": state.config.signup_token_grant }),
        )
        .await;

    Ok(Json(CreateAgencyResponse {
        agency: AgencyResponse::from(agency),
        membership_id: membership.id,
        user_id: user.id,
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/agencies/{id}/email-config",
    tag = "agencies",
    params(("id" = Uuid, Path, description = "Agency ID")),
    responses(
        (status = 200, description = "Email configuration (secrets stripped)", body = EmailConfigResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_email_config(
    caller: Caller,
    Path(agency_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .gate
        .require_agency(&caller, agency_id, Permission::EmailConfigView)
        .map_err(HttpAppError)?;

    let config = state
        .email_configs
        .get_by_agency(agency_id)
        .await
        .map_err(AppError::from)
        .map_err(HttpAppError)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Email config not found".to_string())))?;

    // The SMTP password stays server-side; the response type has no field
    // for it.
    Ok(Json(EmailConfigResponse {
        agency_id: config.agency_id,
        from_name: config.from_name,
        from_email: config.from_email,
        reply_to: config.reply_to,
        smtp_host: config.smtp_host,
        smtp_port: config.smtp_port,
        smtp_username: config.smtp_username,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/agencies/{id}/activity",
    tag = "agencies",
    params(("id" = Uuid, Path, description = "Agency ID"), ActivityQuery),
    responses(
        (status = 200, description = "Audit trail, newest first"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_activity(
    caller: Caller,
    Path(agency_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<ActivityQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .gate
        .require_agency(&caller, agency_id, Permission::MemberManage)
        .map_err(HttpAppError)?;

    let limit = q.limit.unwrap_or(50).min(500);
    let offset = q.offset.unwrap_or(0);
    let entries: Vec<ActivityLogEntry> = state
        .activity_log
        .list_by_agency(agency_id, limit, offset)
        .await
        .map_err(AppError::from)
        .map_err(HttpAppError)?;
    Ok(Json(entries))
}
