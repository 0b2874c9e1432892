//! Filtering and sorting of intake collections
//!
//! Filters are AND-combined; each set-valued filter matches any of its values
//! and an empty set does not filter. Sorting is stable, so intakes with equal
//! keys keep their input order in both directions.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::models::{ComplexityBand, Intake, IntakeStatus, ProductionTime};

/// Already-typed filter values. Parsing from query strings happens at the
/// HTTP boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeFilters {
    pub status: Vec<IntakeStatus>,
    pub complexity_band: Vec<ComplexityBand>,
    /// Case-insensitive substring of the requestor name.
    pub requestor_name: Option<String>,
    pub plan_year: Option<i32>,
    pub requested_production_time: Vec<ProductionTime>,
}

impl IntakeFilters {
    pub fn matches(&self, intake: &Intake) -> bool {
        if !self.status.is_empty() && !self.status.contains(&intake.status) {
            return false;
        }
        if !self.complexity_band.is_empty()
            && !self.complexity_band.contains(&intake.complexity_band)
        {
            return false;
        }
        if let Some(needle) = self.requestor_name.as_deref().filter(|n| !n.is_empty()) {
            if !intake
                .requestor_name
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(year) = self.plan_year {
            if intake.plan_year != year {
                return false;
            }
        }
        if !self.requested_production_time.is_empty()
            && !self
                .requested_production_time
                .contains(&intake.requested_production_time)
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ClientName,
    RequestorName,
    GuideType,
    CommunicationsAddOns,
    ComplexityBand,
    #[default]
    DateReceived,
    Status,
    RequestedProductionTime,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::ClientName,
        SortField::RequestorName,
        SortField::GuideType,
        SortField::CommunicationsAddOns,
        SortField::ComplexityBand,
        SortField::DateReceived,
        SortField::Status,
        SortField::RequestedProductionTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::ClientName => "clientName",
            SortField::RequestorName => "requestorName",
            SortField::GuideType => "guideType",
            SortField::CommunicationsAddOns => "communicationsAddOns",
            SortField::ComplexityBand => "complexityBand",
            SortField::DateReceived => "dateReceived",
            SortField::Status => "status",
            SortField::RequestedProductionTime => "requestedProductionTime",
        }
    }

    /// Lower-cased text key for every field except `dateReceived`.
    fn text_key(&self, intake: &Intake) -> String {
        match self {
            SortField::ClientName => intake.client_name.to_lowercase(),
            SortField::RequestorName => intake.requestor_name.to_lowercase(),
            SortField::GuideType => intake.guide_type.as_str().to_lowercase(),
            SortField::CommunicationsAddOns => intake.communications_add_ons.as_str().to_lowercase(),
            SortField::ComplexityBand => intake.complexity_band.as_str().to_lowercase(),
            SortField::Status => intake.status.as_str().to_lowercase(),
            SortField::RequestedProductionTime => {
                intake.requested_production_time.as_str().to_lowercase()
            }
            SortField::DateReceived => String::new(),
        }
    }

    fn compare(&self, a: &Intake, b: &Intake) -> Ordering {
        match self {
            SortField::DateReceived => a.date_received.cmp(&b.date_received),
            _ => self.text_key(a).cmp(&self.text_key(b)),
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid sortBy: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(AppError::InvalidInput(format!("Invalid order: {}", s))),
        }
    }
}

/// Filter then sort `intakes`, returning a new vector.
pub fn apply(
    intakes: &[Intake],
    filters: &IntakeFilters,
    sort_by: SortField,
    order: SortOrder,
) -> Vec<Intake> {
    let mut out: Vec<Intake> = intakes
        .iter()
        .filter(|intake| filters.matches(intake))
        .cloned()
        .collect();
    out.sort_by(|a, b| match order {
        SortOrder::Asc => sort_by.compare(a, b),
        SortOrder::Desc => sort_by.compare(b, a),
    });
    out
}
