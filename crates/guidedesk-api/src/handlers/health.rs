use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub storage_backend: String,
}

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unavailable", body = HealthCheckResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.storage.clone();
    let storage_status = run_check(
        Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS),
        async move {
            storage
                .exists("health-check-non-existent-key")
                .await
                .map(drop)
        },
        "unhealthy",
    )
    .await;

    let healthy = storage_status == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        storage: storage_status,
        storage_backend: state.storage.backend_type().to_string(),
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}
