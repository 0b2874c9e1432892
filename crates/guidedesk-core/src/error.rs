//! Error types module
//!
//! All domain errors are unified under `AppError`. Each variant describes how it
//! should be presented to a caller through the `ErrorMetadata` trait, so the HTTP
//! layer never has to match on variants itself.

use std::collections::BTreeMap;
use std::io;

use crate::models::IntakeStatus;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like id collisions
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
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
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        /// Field name (camelCase, as sent by the caller) to message.
        field_errors: BTreeMap<String, String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("Illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: IntakeStatus,
        to: IntakeStatus,
    },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

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
    /// Build a validation error from per-field messages.
    pub fn validation(field_errors: BTreeMap<String, String>) -> Self {
        let message = if field_errors.len() == 1 {
            "1 field is invalid".to_string()
        } else {
            format!("{} fields are invalid", field_errors.len())
        };
        AppError::Validation {
            message,
            field_errors,
        }
    }

    /// Validation error for a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), message.into());
        Self::validation(field_errors)
    }

    pub fn intake_not_found(intake_id: &str) -> Self {
        AppError::NotFound(format!("Intake {} not found", intake_id))
    }

    /// Field-level details, when this is a validation error.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            AppError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Validation { .. } => "Validation",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::IllegalTransition { .. } => "IllegalTransition",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Storage(_) => "Storage",
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
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::validation(crate::validation::collect_field_errors(&err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
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
        AppError::Validation { .. } => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Correct the listed fields and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the intake ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            500,
            "CONSTRAINT_VIOLATION",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Warn,
        ),
        AppError::IllegalTransition { .. } => (
            409,
            "ILLEGAL_STATUS_TRANSITION",
            false,
            Some("Move the intake through the intermediate statuses"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size"),
            false,
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
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
            AppError::Validation { message, .. } => message.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Conflict(_) => "Request conflicted with existing data".to_string(),
            AppError::IllegalTransition { from, to } => {
                format!("Cannot move intake from {} to {}", from, to)
            }
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::field("clientName", "Client name is required");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.field_errors().unwrap().get("clientName").unwrap(),
            "Client name is required"
        );
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::intake_not_found("EG-2026-0001");
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Intake EG-2026-0001 not found");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_conflict_is_retryable_server_error() {
        let err = AppError::Conflict("duplicate intake id".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert!(err.is_recoverable());
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = AppError::IllegalTransition {
            from: IntakeStatus::DeliveredToConsultant,
            to: IntakeStatus::NotStarted,
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(
            err.client_message(),
            "Cannot move intake from DELIVERED_TO_CONSULTANT to NOT_STARTED"
        );
    }

    #[test]
    fn test_internal_hides_details() {
        let err: AppError = anyhow::anyhow!("lock poisoned").into();
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.detailed_message().contains("lock poisoned"));
    }
}
