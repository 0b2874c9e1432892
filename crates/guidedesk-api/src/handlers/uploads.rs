//! Upload handlers
//!
//! Files are attached with a multipart form holding one `file` field and an
//! optional `kind` field (`GUIDE`, `PLAN_DOC`, `PAYROLL_SCREEN`, `OTHER`;
//! default `OTHER`). Downloads are streamed from storage.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, Response, StatusCode},
    response::{IntoResponse, Json},
};
use futures::StreamExt;
use guidedesk_core::models::{Upload, UploadKind};
use guidedesk_core::AppError;
use guidedesk_infra::ErrorResponse;
use std::sync::Arc;

use super::parse_upload_id;
use crate::error::HttpAppError;
use crate::state::AppState;

/// File extracted from a multipart upload form.
struct UploadForm {
    data: Vec<u8>,
    filename: String,
    content_type: String,
    kind: UploadKind,
}

/// Read the `file` and `kind` fields. Exactly one `file` field is accepted.
async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<(Vec<u8>, String, String)> = None;
    let mut kind = UploadKind::Other;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read file data: {}", e))
                })?;
                file = Some((data.to_vec(), filename, content_type));
            }
            "kind" => {
                let text = field.text().await.map_err(|e| {
                    AppError::InvalidInput(format!("Failed to read kind field: {}", e))
                })?;
                kind = text.trim().parse()?;
            }
            _ => {}
        }
    }

    let (data, filename, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok(UploadForm {
        data,
        filename,
        content_type,
        kind,
    })
}

fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Attach a file to an intake
#[utoipa::path(
    post,
    path = "/api/v0/intakes/{intake_id}/uploads",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = Upload),
        (status = 400, description = "Missing or empty file, or unknown kind", body = ErrorResponse),
        (status = 404, description = "Intake not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    tag = "uploads"
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = extract_upload_form(multipart).await?;
    validate_file_size(form.data.len(), state.config.max_upload_size_bytes)?;

    let upload = state
        .intakes
        .attach_upload(
            &intake_id,
            form.kind,
            &form.filename,
            &form.content_type,
            form.data,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(upload)))
}

#[utoipa::path(
    get,
    path = "/api/v0/intakes/{intake_id}/uploads",
    params(
        ("intake_id" = String, Path, description = "Intake ID")
    ),
    responses(
        (status = 200, description = "Uploads, oldest first", body = Vec<Upload>),
        (status = 404, description = "Intake not found", body = ErrorResponse)
    ),
    tag = "uploads"
)]
#[tracing::instrument(skip(state))]
pub async fn list_uploads(
    State(state): State<Arc<AppState>>,
    Path(intake_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.intakes.require(&intake_id).await?;
    let uploads = state.intakes.uploads().list_by_intake(&intake_id).await?;
    Ok(Json(uploads))
}

/// Download the stored file
#[utoipa::path(
    get,
    path = "/api/v0/uploads/{upload_id}",
    params(
        ("upload_id" = String, Path, description = "Upload ID (UUID)")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed upload id", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse)
    ),
    tag = "uploads"
)]
#[tracing::instrument(skip(state))]
pub async fn download_upload(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_upload_id(&upload_id)?;
    let (upload, stream) = state.intakes.uploads().open(id).await?;

    tracing::debug!(
        upload_id = %id,
        stored_key = %upload.stored_key,
        "Streaming upload from storage"
    );

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let content_disposition = format!(
        "attachment; filename=\"{}\"",
        upload.original_name.replace(['"', '\\', '\r', '\n'], "_")
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, upload.mime_type.as_str())
        .header(header::CONTENT_DISPOSITION, content_disposition.as_str())
        .header(header::CONTENT_LENGTH, upload.size_bytes)
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

#[utoipa::path(
    delete,
    path = "/api/v0/uploads/{upload_id}",
    params(
        ("upload_id" = String, Path, description = "Upload ID (UUID)")
    ),
    responses(
        (status = 204, description = "Upload deleted"),
        (status = 404, description = "Upload not found", body = ErrorResponse)
    ),
    tag = "uploads"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_upload(
    State(state): State<Arc<AppState>>,
    Path(upload_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_upload_id(&upload_id)?;
    state.intakes.uploads().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
