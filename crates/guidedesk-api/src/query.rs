//! Boundary parsing of list and export query strings
//!
//! Set-valued filters arrive either as a JSON-encoded array
//! (`status=["STARTED","ROADBLOCK"]`) or as a comma-separated list
//! (`status=STARTED,ROADBLOCK`). Everything is converted to typed values here;
//! the listing engine never sees raw strings.

use guidedesk_core::listing::{IntakeFilters, SortField, SortOrder};
use guidedesk_core::AppError;
use serde::Deserialize;
use std::str::FromStr;
use utoipa::IntoParams;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListIntakesQuery {
    /// Statuses to include, as a JSON array or comma-separated list.
    pub status: Option<String>,
    /// Complexity bands to include, as a JSON array or comma-separated list.
    pub complexity_band: Option<String>,
    /// Case-insensitive substring of the requestor name.
    pub requestor_name: Option<String>,
    pub plan_year: Option<String>,
    /// Production times to include, as a JSON array or comma-separated list.
    pub requested_production_time: Option<String>,
    /// One of clientName, requestorName, guideType, communicationsAddOns,
    /// complexityBand, dateReceived, status, requestedProductionTime.
    pub sort_by: Option<String>,
    /// asc or desc (default desc).
    pub order: Option<String>,
}

/// Typed form of [`ListIntakesQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub filters: IntakeFilters,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl ListIntakesQuery {
    pub fn parse(&self) -> Result<ListParams, AppError> {
        let filters = IntakeFilters {
            status: parse_set("status", self.status.as_deref())?,
            complexity_band: parse_set("complexityBand", self.complexity_band.as_deref())?,
            requestor_name: self
                .requestor_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            plan_year: parse_plan_year(self.plan_year.as_deref())?,
            requested_production_time: parse_set(
                "requestedProductionTime",
                self.requested_production_time.as_deref(),
            )?,
        };

        let sort_by = match non_empty(self.sort_by.as_deref()) {
            Some(raw) => raw.parse()?,
            None => SortField::default(),
        };
        let order = match non_empty(self.order.as_deref()) {
            Some(raw) => raw.parse()?,
            None => SortOrder::default(),
        };

        Ok(ListParams {
            filters,
            sort_by,
            order,
        })
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_plan_year(raw: Option<&str>) -> Result<Option<i32>, AppError> {
    non_empty(raw)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid planYear: {}", s)))
        })
        .transpose()
}

/// Parse a set-valued filter into typed values. An absent or empty parameter
/// yields an empty set, which does not filter.
pub fn parse_set<T>(name: &str, raw: Option<&str>) -> Result<Vec<T>, AppError>
where
    T: FromStr<Err = AppError>,
{
    let Some(raw) = non_empty(raw) else {
        return Ok(Vec::new());
    };

    let items: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str(raw).map_err(|_| {
            AppError::InvalidInput(format!(
                "Invalid {} filter: expected a JSON array of strings",
                name
            ))
        })?
    } else {
        raw.split(',').map(|s| s.trim().to_string()).collect()
    };

    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(T::from_str)
        .collect()
}
