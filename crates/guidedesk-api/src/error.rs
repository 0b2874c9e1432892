//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` converts into `HttpAppError` with `?`, so every
//! failure renders the same `ErrorResponse` body and is logged at the level its
//! metadata asks for.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use guidedesk_core::{AppError, ErrorMetadata, LogLevel};
use guidedesk_infra::ErrorResponse;
use guidedesk_storage::StorageError;
use serde::de::DeserializeOwned;

/// Wrapper type for AppError to implement IntoResponse.
/// Both `IntoResponse` and `AppError` are foreign to this crate, so the orphan
/// rule requires a local type in between.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let message = if body_text.contains("unknown variant") {
            format!(
                "Invalid request body: {}. Enum values are upper-case wire strings such as NOT_STARTED.",
                body_text
            )
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::InvalidInput(message))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
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

/// Render the response body. Field errors are always included; details and
/// the error type only outside production and for non-sensitive errors.
pub fn error_response(app_error: &AppError, is_production: bool) -> ErrorResponse {
    let show_details = !is_production && !app_error.is_sensitive();
    ErrorResponse {
        error: app_error.client_message(),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
        details: show_details.then(|| app_error.detailed_message()),
        error_type: show_details.then(|| app_error.error_type().to_string()),
        field_errors: app_error.field_errors().cloned(),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = error_response(app_error, is_production_env());
        (status, Json(body)).into_response()
    }
}
