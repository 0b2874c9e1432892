use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// What an uploaded file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadKind {
    Guide,
    PlanDoc,
    PayrollScreen,
    Other,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Guide => "GUIDE",
            UploadKind::PlanDoc => "PLAN_DOC",
            UploadKind::PayrollScreen => "PAYROLL_SCREEN",
            UploadKind::Other => "OTHER",
        }
    }
}

impl Display for UploadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GUIDE" => Ok(UploadKind::Guide),
            "PLAN_DOC" => Ok(UploadKind::PlanDoc),
            "PAYROLL_SCREEN" => Ok(UploadKind::PayrollScreen),
            "OTHER" => Ok(UploadKind::Other),
            _ => Err(AppError::InvalidInput(format!("Invalid upload kind: {}", s))),
        }
    }
}

/// File attached to an intake. The bytes live in storage under `stored_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: Uuid,
    pub intake_id: String,
    pub kind: UploadKind,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub stored_key: String,
    pub created_at: DateTime<Utc>,
}
