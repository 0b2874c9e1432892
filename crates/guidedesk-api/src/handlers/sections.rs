//! Section detail handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use guidedesk_core::models::{
    BulkCreateResult, BulkCreateSectionsRequest, SectionDetail, SectionInput, SectionPayload,
    UpsertOutcome,
};
use guidedesk_core::AppError;
use guidedesk_infra::ErrorResponse;
use std::sync::Arc;

use super::parse_section_code;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// All sections of an intake, ordered by code
#[utoipa::path(
    get,
    path = "/api/v0/intakes/{intake_id}/sections",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    responses(
        (status = 200, description = "Sections", body = Vec<SectionDetail>),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state))]
pub async fn list_sections(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.intakes.require(&intake_id).await?;
    let sections = state.intakes.sections().get_by_intake(&intake_id).await?;
    Ok(Json(sections))
}

/// Create one section if it does not exist yet
#[utoipa::path(
    post,
    path = "/api/v0/intakes/{intake_id}/sections",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    request_body = SectionInput,
    responses(
        (status = 201, description = "Section created", body = BulkCreateResult),
        (status = 200, description = "Section already existed and was left unchanged", body = BulkCreateResult),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state, request))]
pub async fn create_section(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
    ValidatedJson(request): ValidatedJson<SectionInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut results = state
        .intakes
        .bulk_create_sections(&intake_id, vec![(request.section_code, request.payload)])
        .await?;
    let result = results
        .pop()
        .ok_or_else(|| AppError::Internal("Section creation returned no result".to_string()))?;

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result)))
}

/// Create several sections; existing ones are reported with `created: false`
#[utoipa::path(
    post,
    path = "/api/v0/intakes/{intake_id}/sections/bulk",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    request_body = BulkCreateSectionsRequest,
    responses(
        (status = 200, description = "Per-section outcome, in request order", body = Vec<BulkCreateResult>),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state, request))]
pub async fn bulk_create_sections(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
    ValidatedJson(request): ValidatedJson<BulkCreateSectionsRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let sections = request
        .sections
        .into_iter()
        .map(|s| (s.section_code, s.payload))
        .collect();
    let results = state
        .intakes
        .bulk_create_sections(&intake_id, sections)
        .await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/v0/intakes/{intake_id}/sections/{section_code}",
    params(
        ("intake_id" = String, Path, description = "Intake ID"),
        ("section_code" = String, Path, description = "Section code, A through Q")
    ),
    responses(
        (status = 200, description = "Section", body = SectionDetail),
        (status = 400, description = "Invalid section code", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state))]
pub async fn get_section(
    State(state): State<Arc<AppState>>,
    Path((intake_id, section_code)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let section_code = parse_section_code(&section_code)?;
    let section = state
        .intakes
        .sections()
        .get(&intake_id, section_code)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Section {} of intake {} not found",
                section_code, intake_id
            ))
        })?;
    Ok(Json(section))
}

/// Replace a section's payload, creating the section if needed
#[utoipa::path(
    put,
    path = "/api/v0/intakes/{intake_id}/sections/{section_code}",
    params(
        ("intake_id" = String, Path, description = "Intake ID"),
        ("section_code" = String, Path, description = "Section code, A through Q")
    ),
    request_body = SectionPayload,
    responses(
        (status = 200, description = "`updated` is true when the section already existed", body = UpsertOutcome),
        (status = 400, description = "Invalid section code", body = ErrorResponse),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn upsert_section(
    State(state): State<Arc<AppState>>,
    Path((intake_id, section_code)): Path<(String, String)>,
    ValidatedJson(payload): ValidatedJson<SectionPayload>,
) -> Result<impl IntoResponse, HttpAppError> {
    let section_code = parse_section_code(&section_code)?;
    let outcome = state
        .intakes
        .upsert_section(&intake_id, section_code, payload)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    delete,
    path = "/api/v0/intakes/{intake_id}/sections/{section_code}",
    params(
        ("intake_id" = String, Path, description = "Intake ID"),
        ("section_code" = String, Path, description = "Section code, A through Q")
    ),
    responses(
        (status = 204, description = "Section deleted"),
        (status = 400, description = "Invalid section code", body = ErrorResponse),
        (status = 404, description = "Section not found", body = ErrorResponse)
    ),
    tag = "sections"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_section(
    State(state): State<Arc<AppState>>,
    Path((intake_id, section_code)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let section_code = parse_section_code(&section_code)?;
    state
        .intakes
        .sections()
        .delete_section(&intake_id, section_code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
