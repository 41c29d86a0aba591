//! Error types module
//!
//! This module provides the core error types used throughout the Adflow
//! application. All errors are unified under the `AppError` enum which can
//! represent database, validation, authorization, lifecycle, and ledger
//! errors.

use std::io;

use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like credit exhaustion
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_STATE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid {entity} state transition: {current} -> {attempted}")]
    InvalidState {
        entity: &'static str,
        current: String,
        attempted: String,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Validation error helper naming the offending field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Invalid-state error helper naming the current and attempted states.
    pub fn invalid_state(
        entity: &'static str,
        current: impl ToString,
        attempted: impl ToString,
    ) -> Self {
        AppError::InvalidState {
            entity,
            current: current.to_string(),
            attempted: attempted.to_string(),
        }
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::validation("id", format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let field = err
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "request".to_string());
        AppError::Validation {
            field,
            message: err.to_string(),
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Validation { .. } => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Fix the named field and retry"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidState { .. } => (
            409,
            "INVALID_STATE",
            false,
            Some("Reload the resource and check its current status"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Check role and agency membership"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Check bearer token or portal key"),
            false,
            LogLevel::Debug,
        ),
        AppError::InsufficientCredits { .. } => (
            402,
            "INSUFFICIENT_CREDITS",
            false,
            Some("Top up the agency credit balance"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Validation { .. } => "Validation",
            AppError::InvalidState { .. } => "InvalidState",
            AppError::Forbidden(_) => "Forbidden",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InsufficientCredits { .. } => "InsufficientCredits",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Validation { field, message } => {
                format!("Validation failed for {}: {}", field, message)
            }
            AppError::InvalidState {
                entity,
                current,
                attempted,
            } => format!(
                "Invalid {} state transition: {} -> {}",
                entity, current, attempted
            ),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::InsufficientCredits {
                required,
                available,
            } => format!(
                "Insufficient credits: {} required, {} available",
                required, available
            ),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        let err = AppError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_invalid_state_names_both_states() {
        let err = AppError::invalid_state("campaign", "draft", "completed");
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE");
        assert!(!err.is_recoverable());
        let msg = err.client_message();
        assert!(msg.contains("draft"));
        assert!(msg.contains("completed"));
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_insufficient_credits_carries_both_amounts() {
        let err = AppError::InsufficientCredits {
            required: 1,
            available: 0,
        };
        assert_eq!(err.http_status_code(), 402);
        assert_eq!(err.error_code(), "INSUFFICIENT_CREDITS");
        assert!(err.client_message().contains('1'));
        assert!(err.client_message().contains('0'));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_validation_names_field() {
        let err = AppError::validation("approver_user_ids", "at least one approver is required");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.client_message().contains("approver_user_ids"));
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_not_found_vs_forbidden() {
        let not_found = AppError::NotFound("Campaign not found".to_string());
        assert_eq!(not_found.http_status_code(), 404);

        let forbidden = AppError::Forbidden("Missing campaign:manage permission".to_string());
        assert_eq!(forbidden.http_status_code(), 403);
    }
}
