//! Bearer authentication middleware.
//!
//! Two token kinds share the Authorization header: staff JWTs, resolved to an
//! active agency membership via the `X-Agency-Id` selector (falling back to
//! the caller's first active membership), and client-portal keys
//! (`cp_live_…`), resolved to an approver contact by prefix lookup and argon2
//! verification. The resolved [`Caller`] is stored in request extensions;
//! everything downstream authorizes against it through the access gate.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use adflow_core::constants::{ACTIVE_AGENCY_HEADER, PORTAL_KEY_PREFIX};
use adflow_core::models::AgencyStatus;
use adflow_core::AppError;
use adflow_db::{AgencyRepository, ClientRepository, MembershipRepository};

use crate::auth::models::{Caller, MemberIdentity, PortalIdentity};
use crate::auth::portal_key::{extract_key_prefix, verify_portal_key};
use crate::error::HttpAppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub agency_repository: AgencyRepository,
    pub membership_repository: MembershipRepository,
    pub client_repository: ClientRepository,
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    if !auth_header.starts_with("Bearer ") {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    }
    let token = &auth_header[7..];

    let caller = if token.starts_with(PORTAL_KEY_PREFIX) {
        authenticate_portal_key(token, &auth_state).await
    } else {
        let active_agency = request
            .headers()
            .get(ACTIVE_AGENCY_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok());
        authenticate_member(token, active_agency, &auth_state).await
    };

    match caller {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

async fn authenticate_member(
    token: &str,
    active_agency: Option<Uuid>,
    auth_state: &AuthState,
) -> Result<Caller, AppError> {
    let claims = crate::auth::jwt::verify_token(token, &auth_state.jwt_secret)?;

    let membership = match active_agency {
        Some(agency_id) => auth_state
            .membership_repository
            .get_active(claims.sub, agency_id)
            .await
            .map_err(AppError::from)?,
        None => auth_state
            .membership_repository
            .first_active_for_user(claims.sub)
            .await
            .map_err(AppError::from)?,
    }
    .ok_or_else(|| AppError::Unauthorized("No active agency membership".to_string()))?;

    let agency = auth_state
        .agency_repository
        .get(membership.agency_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Unauthorized("Agency not found".to_string()))?;
    if agency.status != AgencyStatus::Active {
        return Err(AppError::Unauthorized("Agency is not active".to_string()));
    }

    Ok(Caller::Member(MemberIdentity {
        user_id: claims.sub,
        membership_id: membership.id,
        agency_id: membership.agency_id,
        role: membership.role,
    }))
}

async fn authenticate_portal_key(token: &str, auth_state: &AuthState) -> Result<Caller, AppError> {
    let prefix = extract_key_prefix(token);
    let candidates = auth_state
        .client_repository
        .get_contacts_by_key_prefix(&prefix)
        .await
        .map_err(AppError::from)?;

    for contact in candidates {
        let hash = match contact.portal_key_hash.as_deref() {
            Some(hash) => hash,
            None => continue,
        };
        if verify_portal_key(token, hash)? {
            if !contact.is_approver {
                return Err(AppError::Unauthorized(
                    "Contact is not an approver".to_string(),
                ));
            }
            return Ok(Caller::Portal(PortalIdentity {
                contact_id: contact.id,
                client_id: contact.client_id,
                agency_id: contact.agency_id,
            }));
        }
    }

    Err(AppError::Unauthorized("Invalid portal key".to_string()))
}
