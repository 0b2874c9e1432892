//! HTTP error response shape
//!
//! The `IntoResponse` implementation lives in the API crate: `axum::IntoResponse`
//! and `guidedesk_core::AppError` are both foreign here, so the orphan rule
//! forbids implementing one for the other in this crate.

use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Per-field validation messages keyed by camelCase field name.
    #[serde(rename = "fieldErrors", skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}
