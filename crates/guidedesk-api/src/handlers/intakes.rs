//! Intake handlers
//!
//! Creation, listing, CSV export, dashboard stats and the per-intake mutations.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use guidedesk_core::csv_export;
use guidedesk_core::models::{
    ComplexityFactorsUpdate, CreateIntakeRequest, CreatedIntake, Intake, IntakeStats,
    SectionFlagsUpdateResponse, UpdateSectionFlagsRequest, UpdateStatusRequest,
};
use guidedesk_core::{AppError, Complexity};
use guidedesk_infra::ErrorResponse;
use std::sync::Arc;

use super::{parse_section_code, SuccessResponse};
use crate::error::{HttpAppError, ValidatedJson};
use crate::query::ListIntakesQuery;
use crate::state::AppState;

/// Create an intake
#[utoipa::path(
    post,
    path = "/api/v0/intakes",
    request_body = CreateIntakeRequest,
    responses(
        (status = 201, description = "Intake created", body = CreatedIntake),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state, request))]
pub async fn create_intake(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateIntakeRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = state.intakes.create(&request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List intakes with filters and sorting
#[utoipa::path(
    get,
    path = "/api/v0/intakes",
    params(ListIntakesQuery),
    responses(
        (status = 200, description = "Filtered and sorted intakes", body = Vec<Intake>),
        (status = 400, description = "Malformed filter or sort parameter", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state))]
pub async fn list_intakes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListIntakesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let params = query.parse()?;
    let intakes = state
        .intakes
        .list(&params.filters, params.sort_by, params.order)
        .await?;
    Ok(Json(intakes))
}

/// Export intakes as CSV
///
/// Accepts the same filter and sort parameters as the list endpoint.
#[utoipa::path(
    get,
    path = "/api/v0/intakes/export.csv",
    params(ListIntakesQuery),
    responses(
        (status = 200, description = "CSV export", content_type = "text/csv"),
        (status = 400, description = "Malformed filter or sort parameter", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state))]
pub async fn export_intakes_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListIntakesQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let params = query.parse()?;
    let body = state
        .intakes
        .export_csv(&params.filters, params.sort_by, params.order)
        .await?;

    let filename = csv_export::export_filename(Utc::now().date_naive());
    let content_disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        [
            (header::CONTENT_TYPE, csv_export::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        body,
    ))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/api/v0/intakes/stats",
    responses(
        (status = 200, description = "Counts by status and complexity band", body = IntakeStats)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state))]
pub async fn intake_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.intakes.stats().await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v0/intakes/{intake_id}",
    params(
        ("intake_id" = String, Path, description = "Intake ID, e.g. EG-2026-0A1Z")
    ),
    responses(
        (status = 200, description = "Intake", body = Intake),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state))]
pub async fn get_intake(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let intake = state
        .intakes
        .get(&intake_id)
        .await?
        .ok_or_else(|| AppError::intake_not_found(&intake_id))?;
    Ok(Json(intake))
}

/// Delete an intake with its sections and uploads
#[utoipa::path(
    delete,
    path = "/api/v0/intakes/{intake_id}",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    responses(
        (status = 204, description = "Intake deleted"),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_intake(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.intakes.delete(&intake_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/api/v0/intakes/{intake_id}/status",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Intake not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed by the workflow policy", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .intakes
        .update_status(&intake_id, request.status)
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Set the changed and/or included flag of one section
#[utoipa::path(
    patch,
    path = "/api/v0/intakes/{intake_id}/sections/{section_code}/flags",
    params(
        ("intake_id" = String, Path, description = "Intake ID"),
        ("section_code" = String, Path, description = "Section code, A through Q")
    ),
    request_body = UpdateSectionFlagsRequest,
    responses(
        (status = 200, description = "Flags updated; complexity included when `changed` was set", body = SectionFlagsUpdateResponse),
        (status = 400, description = "Invalid section code or empty update", body = ErrorResponse),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_section_flags(
    State(state): State<Arc<AppState>>,
    Path((intake_id, section_code)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<UpdateSectionFlagsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let section_code = parse_section_code(&section_code)?;
    if request.changed.is_none() && request.included.is_none() {
        return Err(AppError::InvalidInput(
            "At least one of changed or included is required".to_string(),
        )
        .into());
    }

    let update = state
        .intakes
        .update_section_flags(&intake_id, section_code, request.changed, request.included)
        .await?;
    Ok(Json(SectionFlagsUpdateResponse::from(update)))
}

/// Update the inputs of the complexity score and recompute it
#[utoipa::path(
    patch,
    path = "/api/v0/intakes/{intake_id}/complexity",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    request_body = ComplexityFactorsUpdate,
    responses(
        (status = 200, description = "Recomputed complexity", body = Complexity),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "intakes"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_complexity(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
    ValidatedJson(request): ValidatedJson<ComplexityFactorsUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let complexity = state
        .intakes
        .update_complexity_factors(&intake_id, &request)
        .await?;
    Ok(Json(complexity))
}
