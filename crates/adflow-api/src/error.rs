//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`.
//! Use `AppError` (or types that implement `Into<AppError>`) for errors and
//! `.map_err(Into::into)` so they become `HttpAppError` and render
//! consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use adflow_core::{AppError, ErrorMetadata, LogLevel};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from adflow-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let is_production = is_production_env();

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production; in non-production, only show
        // details for non-sensitive errors.
        let body = if is_production || app_error.is_sensitive() {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: None,
                error_type: None,
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        } else {
            Json(ErrorResponse {
                error: app_error.client_message(),
                details: Some(app_error.detailed_message()),
                error_type: Some(app_error.error_type().to_string()),
                code: app_error.error_code().to_string(),
                recoverable: app_error.is_recoverable(),
                suggested_action: app_error.suggested_action().map(String::from),
            })
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies the public error response contract: serialized ErrorResponse
    /// has "error", "code", "recoverable", and optionally "details" /
    /// "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Not found".to_string(),
            details: Some("Campaign not found".to_string()),
            error_type: Some("NotFound".to_string()),
            code: "NOT_FOUND".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("error").and_then(|v| v.as_str()).is_some());
        assert!(json.get("code").and_then(|v| v.as_str()).is_some());
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("NOT_FOUND"));
    }

    #[test]
    fn test_insufficient_credits_maps_to_402() {
        let err = HttpAppError(AppError::InsufficientCredits {
            required: 1,
            available: 0,
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn test_invalid_state_maps_to_409() {
        let err = HttpAppError(AppError::invalid_state("campaign", "draft", "completed"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
