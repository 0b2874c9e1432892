pub mod health;
pub mod intakes;
pub mod sections;
pub mod uploads;

use guidedesk_core::models::SectionCode;
use guidedesk_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        SuccessResponse { success: true }
    }
}

/// Section codes are taken from the path as text so a bad code gets our 400
/// body instead of axum's plain-text path rejection.
pub(crate) fn parse_section_code(raw: &str) -> Result<SectionCode, AppError> {
    raw.parse()
}

pub(crate) fn parse_upload_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("Invalid upload id: {}", raw)))
}
