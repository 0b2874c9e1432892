//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use guidedesk_core::models;
use guidedesk_core::{Complexity, SortField, SortOrder};
use guidedesk_infra::ErrorResponse;

/// Served at `/api/openapi.json` and rendered by RapiDoc at `/api/docs`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Guidedesk API",
        version = "0.1.0",
        description = "Enrollment-guide intake tracking: intake creation, status workflow, per-section details, complexity scoring, dashboard stats, CSV export and file attachments. All resource endpoints are versioned under /api/v0/."
    ),
    paths(
        // Intakes
        handlers::intakes::create_intake,
        handlers::intakes::list_intakes,
        handlers::intakes::export_intakes_csv,
        handlers::intakes::intake_stats,
        handlers::intakes::get_intake,
        handlers::intakes::delete_intake,
        handlers::intakes::update_status,
        handlers::intakes::update_section_flags,
        handlers::intakes::update_complexity,
        // Sections
        handlers::sections::list_sections,
        handlers::sections::create_section,
        handlers::sections::bulk_create_sections,
        handlers::sections::get_section,
        handlers::sections::upsert_section,
        handlers::sections::delete_section,
        // Uploads
        handlers::uploads::upload_file,
        handlers::uploads::list_uploads,
        handlers::uploads::download_upload,
        handlers::uploads::delete_upload,
        // Health
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Intake,
            models::IntakeStatus,
            models::GuideType,
            models::CommunicationsAddOns,
            models::ProductionTime,
            models::ComplexityBand,
            models::CreateIntakeRequest,
            models::CreatedIntake,
            models::UpdateStatusRequest,
            models::UpdateSectionFlagsRequest,
            models::SectionFlagsUpdateResponse,
            models::ComplexityFactorsUpdate,
            models::IntakeStats,
            models::SectionCode,
            models::SectionPayload,
            models::SectionDetail,
            models::SectionInput,
            models::BulkCreateSectionsRequest,
            models::BulkCreateResult,
            models::UpsertOutcome,
            models::Upload,
            models::UploadKind,
            Complexity,
            SortField,
            SortOrder,
            ErrorResponse,
            handlers::SuccessResponse,
            handlers::health::HealthCheckResponse,
        )
    ),
    tags(
        (name = "intakes", description = "Intake lifecycle, listing, stats and export"),
        (name = "sections", description = "Per-section change descriptions"),
        (name = "uploads", description = "Files attached to intakes"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
