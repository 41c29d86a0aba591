//! Payment handlers. The transition to `paid` is one-way; there is no path
//! that modifies a paid row.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use adflow_core::models::{Payment, PaymentStatus};
use adflow_core::{AppError, Permission};

use crate::auth::models::Caller;
use crate::error::HttpAppError;
use crate::services::audit::snapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreatePaymentRequest {
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[utoipa::path(
    post,
    path = "/api/v1/campaign-creators/{id}/payments",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Campaign creator ID")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 200, description = "Payment created"),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn create_payment(
    caller: Caller,
    Path(campaign_creator_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if req.amount_cents <= 0 {
        return Err(HttpAppError(AppError::validation(
            "amount_cents",
            "must be positive",
        )));
    }
    state
        .gate
        .require_permission(&caller, Permission::ClientManage)
        .map_err(HttpAppError)?;

    let campaign_creator = state
        .creators
        .get_campaign_creator(campaign_creator_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Campaign creator not found".to_string())))?;
    if campaign_creator.agency_id != caller.agency_id() {
        return Err(HttpAppError(AppError::NotFound(
            "Campaign creator not found".to_string(),
        )));
    }

    let payment = state
        .payments
        .create(
            campaign_creator_id,
            campaign_creator.agency_id,
            req.amount_cents,
            &req.currency,
        )
        .await
        .map_err(HttpAppError::from)?;

    state
        .audit
        .record(
            payment.agency_id,
            "payment",
            payment.id,
            "payment_created",
            &caller,
            None,
            snapshot(&payment),
            serde_json::json!({}),
        )
        .await;
    Ok(Json(payment))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_payment(
    caller: Caller,
    Path(payment_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payment = load_payment(&state, &caller, payment_id).await?;
    Ok(Json(payment))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/mark-processing",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment processing"),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn mark_payment_processing(
    caller: Caller,
    Path(payment_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payment = load_payment(&state, &caller, payment_id).await?;
    let updated = state
        .payments
        .mark_processing(payment_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| {
            HttpAppError(AppError::invalid_state(
                "payment",
                payment.status,
                PaymentStatus::Processing,
            ))
        })?;
    record_payment_audit(&state, &caller, &payment, &updated, "payment_processing").await;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/mark-paid",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment paid (irreversible)"),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn mark_payment_paid(
    caller: Caller,
    Path(payment_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payment = load_payment(&state, &caller, payment_id).await?;
    let updated = state
        .payments
        .mark_paid(payment_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| {
            HttpAppError(AppError::invalid_state(
                "payment",
                payment.status,
                PaymentStatus::Paid,
            ))
        })?;
    record_payment_audit(&state, &caller, &payment, &updated, "payment_paid").await;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/mark-failed",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment failed"),
        (status = 409, description = "Invalid state", body = crate::error::ErrorResponse),
    )
)]
pub async fn mark_payment_failed(
    caller: Caller,
    Path(payment_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let payment = load_payment(&state, &caller, payment_id).await?;
    let updated = state
        .payments
        .mark_failed(payment_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| {
            HttpAppError(AppError::invalid_state(
                "payment",
                payment.status,
                PaymentStatus::Failed,
            ))
        })?;
    record_payment_audit(&state, &caller, &payment, &updated, "payment_failed").await;
    Ok(Json(updated))
}

async fn load_payment(
    state: &AppState,
    caller: &Caller,
    payment_id: Uuid,
) -> Result<Payment, HttpAppError> {
    let payment = state
        .payments
        .get(payment_id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| HttpAppError(AppError::NotFound("Payment not found".to_string())))?;
    if payment.agency_id != caller.agency_id() {
        return Err(HttpAppError(AppError::NotFound(
            "Payment not found".to_string(),
        )));
    }
    state
        .gate
        .require_permission(caller, Permission::ClientManage)
        .map_err(HttpAppError)?;
    Ok(payment)
}

async fn record_payment_audit(
    state: &AppState,
    caller: &Caller,
    before: &Payment,
    after: &Payment,
    action: &str,
) {
    state
        .audit
        .record(
            after.agency_id,
            "payment",
            after.id,
            action,
            caller,
            snapshot(before),
            snapshot(after),
            serde_json::json!({}),
        )
        .await;
}
