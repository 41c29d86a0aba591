//! Caller identities resolved by the auth middleware and consumed by the
//! access gate. A request acts either through an agency membership (staff
//! JWT) or through a client-portal contact (portal key), never both.

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adflow_core::models::MemberRole;

use crate::error::ErrorResponse;

/// JWT claims structure for staff tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub exp: i64,  // expiration timestamp
    pub iat: i64,  // issued at timestamp
}

/// An agency member acting through one resolved membership. The role is
/// resolved once here; the gate checks it against the permission matrix
/// without further lookups.
#[derive(Debug, Clone)]
pub struct MemberIdentity {
    pub user_id: Uuid,
    pub membership_id: Uuid,
    pub agency_id: Uuid,
    pub role: MemberRole,
}

/// A client-portal contact with approver rights, scoped to exactly one
/// client.
#[derive(Debug, Clone)]
pub struct PortalIdentity {
    pub contact_id: Uuid,
    pub client_id: Uuid,
    pub agency_id: Uuid,
}

/// The authenticated caller, stored in request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub enum Caller {
    Member(MemberIdentity),
    Portal(PortalIdentity),
}

impl Caller {
    pub fn agency_id(&self) -> Uuid {
        match self {
            Caller::Member(m) => m.agency_id,
            Caller::Portal(p) => p.agency_id,
        }
    }

    /// Actor ids for the audit log: (user_id, contact_id).
    pub fn actor_ids(&self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            Caller::Member(m) => (Some(m.user_id), None),
            Caller::Portal(p) => (None, Some(p.contact_id)),
        }
    }
}

fn missing_context_rejection() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Missing caller context".to_string(),
            details: None,
            error_type: None,
            code: "UNAUTHORIZED".to_string(),
            recoverable: false,
            suggested_action: Some("Check bearer token or portal key".to_string()),
        }),
    )
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .ok_or_else(missing_context_rejection)
    }
}

/// Extractor for staff-only endpoints: rejects portal callers.
impl<S> FromRequestParts<S> for MemberIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Caller>() {
            Some(Caller::Member(member)) => Ok(member.clone()),
            Some(Caller::Portal(_)) => Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "Portal identities cannot access this endpoint".to_string(),
                    details: None,
                    error_type: None,
                    code: "FORBIDDEN".to_string(),
                    recoverable: false,
                    suggested_action: None,
                }),
            )),
            None => Err(missing_context_rejection()),
        }
    }
}

/// Extractor for portal-only endpoints: rejects staff callers.
impl<S> FromRequestParts<S> for PortalIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Caller>() {
            Some(Caller::Portal(portal)) => Ok(portal.clone()),
            Some(Caller::Member(_)) => Err((
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "This endpoint requires a client-portal identity".to_string(),
                    details: None,
                    error_type: None,
                    code: "FORBIDDEN".to_string(),
                    recoverable: false,
                    suggested_action: None,
                }),
            )),
            None => Err(missing_context_rejection()),
        }
    }
}
