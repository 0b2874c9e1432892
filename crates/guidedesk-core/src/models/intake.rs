use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::Validate;

use super::section::{PartialSectionFlags, SectionFlags};
use crate::complexity::{calculate_complexity, Complexity};
use crate::error::AppError;
use crate::validation::not_blank;

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a wire enum.
macro_rules! wire_enum {
    ($name:ident, $label:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation, as stored and exported.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| AppError::InvalidInput(format!("Invalid {}: {}", $label, s)))
            }
        }
    };
}

/// Workflow status of an intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeStatus {
    NotStarted,
    Started,
    Roadblock,
    ReadyForQa,
    DeliveredToConsultant,
}

wire_enum!(IntakeStatus, "status", {
    NotStarted => "NOT_STARTED",
    Started => "STARTED",
    Roadblock => "ROADBLOCK",
    ReadyForQa => "READY_FOR_QA",
    DeliveredToConsultant => "DELIVERED_TO_CONSULTANT",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuideType {
    UpdateExistingGuide,
    NewGuideBuild,
}

wire_enum!(GuideType, "guide type", {
    UpdateExistingGuide => "UPDATE_EXISTING_GUIDE",
    NewGuideBuild => "NEW_GUIDE_BUILD",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationsAddOns {
    None,
    OeLetter,
    OePresentation,
    Both,
    Other,
}

wire_enum!(CommunicationsAddOns, "communications add-ons", {
    None => "NONE",
    OeLetter => "OE_LETTER",
    OePresentation => "OE_PRESENTATION",
    Both => "BOTH",
    Other => "OTHER",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionTime {
    Standard,
    Rush,
}

wire_enum!(ProductionTime, "requested production time", {
    Standard => "STANDARD",
    Rush => "RUSH",
});

/// Four-level classification derived from the complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ComplexityBand {
    Minimal,
    Low,
    Medium,
    High,
}

wire_enum!(ComplexityBand, "complexity band", {
    Minimal => "Minimal",
    Low => "Low",
    Medium => "Medium",
    High => "High",
});

impl ComplexityBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=3 => ComplexityBand::Minimal,
            4..=8 => ComplexityBand::Low,
            9..=15 => ComplexityBand::Medium,
            _ => ComplexityBand::High,
        }
    }

    /// Position in the Minimal < Low < Medium < High ladder.
    pub fn rank(&self) -> u8 {
        match self {
            ComplexityBand::Minimal => 0,
            ComplexityBand::Low => 1,
            ComplexityBand::Medium => 2,
            ComplexityBand::High => 3,
        }
    }
}

/// One enrollment-guide production request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    pub intake_id: String,
    pub client_name: String,
    pub requestor_name: String,
    pub payroll_storage_url: String,
    pub plan_year: i32,
    pub guide_type: GuideType,
    pub communications_add_ons: CommunicationsAddOns,
    pub requested_production_time: ProductionTime,
    #[serde(default)]
    pub notes_general: Option<String>,
    pub status: IntakeStatus,
    #[schema(value_type = Object)]
    pub sections_changed_flags: SectionFlags,
    #[schema(value_type = Object)]
    pub sections_included_flags: SectionFlags,
    pub complexity_score: u32,
    pub complexity_band: ComplexityBand,
    pub date_received: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Intake {
    /// Score the current changed flags, guide type and add-ons.
    pub fn complexity(&self) -> Complexity {
        calculate_complexity(
            &self.sections_changed_flags,
            Some(self.guide_type),
            Some(self.communications_add_ons),
        )
    }

    /// Recompute and store `complexity_score`/`complexity_band`.
    pub fn refresh_complexity(&mut self) -> Complexity {
        let complexity = self.complexity();
        self.complexity_score = complexity.score;
        self.complexity_band = complexity.band;
        complexity
    }
}

/// A request field that keeps unparseable input instead of failing the whole
/// body, so validation can report it next to the other field errors.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue<T> {
    Valid(T),
    Invalid(serde_json::Value),
}

impl<T> FieldValue<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            FieldValue::Valid(value) => Some(value),
            FieldValue::Invalid(_) => None,
        }
    }
}

impl<T> From<T> for FieldValue<T> {
    fn from(value: T) -> Self {
        FieldValue::Valid(value)
    }
}

/// Request body for creating an intake.
///
/// Required strings default to empty so that a missing field is reported as a
/// field error rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntakeRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Client name must be at most 255 characters")
    )]
    pub client_name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Requestor name must be at most 255 characters")
    )]
    pub requestor_name: String,
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 2048, message = "Payroll storage URL must be at most 2048 characters")
    )]
    pub payroll_storage_url: String,
    #[serde(default)]
    #[validate(required(message = "Plan year is required"))]
    #[schema(value_type = Option<i32>)]
    pub plan_year: Option<FieldValue<i32>>,
    #[serde(default)]
    #[validate(required(message = "Guide type is required"))]
    #[schema(value_type = Option<GuideType>)]
    pub guide_type: Option<FieldValue<GuideType>>,
    #[serde(default)]
    #[validate(required(message = "Communications add-ons are required"))]
    #[schema(value_type = Option<CommunicationsAddOns>)]
    pub communications_add_ons: Option<FieldValue<CommunicationsAddOns>>,
    #[serde(default)]
    #[validate(required(message = "Requested production time is required"))]
    #[schema(value_type = Option<ProductionTime>)]
    pub requested_production_time: Option<FieldValue<ProductionTime>>,
    #[serde(default)]
    #[validate(length(max = 10000, message = "Notes must be at most 10000 characters"))]
    pub notes_general: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub sections_changed_flags: Option<PartialSectionFlags>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub sections_included_flags: Option<PartialSectionFlags>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIntake {
    pub intake_id: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: IntakeStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateSectionFlagsRequest {
    #[serde(default)]
    pub changed: Option<bool>,
    #[serde(default)]
    pub included: Option<bool>,
}

/// Partial update of the inputs the complexity score depends on.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityFactorsUpdate {
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub sections_changed_flags: Option<PartialSectionFlags>,
    #[serde(default)]
    pub guide_type: Option<GuideType>,
    #[serde(default)]
    pub communications_add_ons: Option<CommunicationsAddOns>,
}

/// Result of a section-flag update. `complexity` is set only when the
/// `changed` flag was part of the update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionFlagsUpdate {
    pub complexity: Option<Complexity>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionFlagsUpdateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity_band: Option<ComplexityBand>,
}

impl From<SectionFlagsUpdate> for SectionFlagsUpdateResponse {
    fn from(update: SectionFlagsUpdate) -> Self {
        SectionFlagsUpdateResponse {
            success: true,
            complexity_score: update.complexity.map(|c| c.score),
            complexity_band: update.complexity.map(|c| c.band),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(IntakeStatus::ReadyForQa.to_string(), "READY_FOR_QA");
        assert_eq!(
            serde_json::to_value(IntakeStatus::DeliveredToConsultant).unwrap(),
            serde_json::json!("DELIVERED_TO_CONSULTANT")
        );
        assert_eq!(
            "NOT_STARTED".parse::<IntakeStatus>().unwrap(),
            IntakeStatus::NotStarted
        );
        assert!("not_started".parse::<IntakeStatus>().is_err());
        assert!("DONE".parse::<IntakeStatus>().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            "NEW_GUIDE_BUILD".parse::<GuideType>().unwrap(),
            GuideType::NewGuideBuild
        );
        assert_eq!(
            "OE_PRESENTATION".parse::<CommunicationsAddOns>().unwrap(),
            CommunicationsAddOns::OePresentation
        );
        assert_eq!("RUSH".parse::<ProductionTime>().unwrap(), ProductionTime::Rush);
        assert_eq!("High".parse::<ComplexityBand>().unwrap(), ComplexityBand::High);
        assert!("HIGH".parse::<ComplexityBand>().is_err());
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ComplexityBand::from_score(0), ComplexityBand::Minimal);
        assert_eq!(ComplexityBand::from_score(3), ComplexityBand::Minimal);
        assert_eq!(ComplexityBand::from_score(4), ComplexityBand::Low);
        assert_eq!(ComplexityBand::from_score(8), ComplexityBand::Low);
        assert_eq!(ComplexityBand::from_score(9), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_score(15), ComplexityBand::Medium);
        assert_eq!(ComplexityBand::from_score(16), ComplexityBand::High);
        assert_eq!(ComplexityBand::from_score(42), ComplexityBand::High);
    }

    #[test]
    fn test_create_request_deserializes_partial_flags() {
        let req: CreateIntakeRequest = serde_json::from_value(serde_json::json!({
            "clientName": "Acme",
            "requestorName": "Dana",
            "payrollStorageUrl": "https://files.example.com/acme",
            "planYear": 2026,
            "guideType": "NEW_GUIDE_BUILD",
            "communicationsAddOns": "BOTH",
            "requestedProductionTime": "RUSH",
            "sectionsChangedFlags": {"C": true}
        }))
        .unwrap();
        assert_eq!(req.guide_type, Some(FieldValue::Valid(GuideType::NewGuideBuild)));
        assert_eq!(req.plan_year, Some(FieldValue::Valid(2026)));
        let flags = req.sections_changed_flags.unwrap();
        assert_eq!(flags.len(), 1);
        assert!(req.sections_included_flags.is_none());
    }

    #[test]
    fn test_create_request_keeps_unparseable_fields() {
        let req: CreateIntakeRequest = serde_json::from_value(serde_json::json!({
            "planYear": "2026",
            "guideType": "BRAND_NEW",
            "communicationsAddOns": 3
        }))
        .unwrap();
        assert_eq!(
            req.plan_year,
            Some(FieldValue::Invalid(serde_json::json!("2026")))
        );
        assert_eq!(
            req.guide_type,
            Some(FieldValue::Invalid(serde_json::json!("BRAND_NEW")))
        );
        assert!(req.communications_add_ons.unwrap().valid().is_none());
        assert!(req.requested_production_time.is_none());
    }
}
