//! Intake creation validation
//!
//! Runs the derive-based field checks on `CreateIntakeRequest`, adds the
//! plan-year range check, and produces a `ValidatedIntake` with trimmed strings
//! and completed section-flag maps.

use chrono::{Datelike, Utc};
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::AppError;
use crate::models::{
    CommunicationsAddOns, CreateIntakeRequest, FieldValue, GuideType, ProductionTime,
    SectionFlags,
};

use super::collect_field_errors;

/// Inclusive range of accepted plan years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanYearRange {
    pub min: i32,
    pub max: i32,
}

impl PlanYearRange {
    /// Bounds saturate at the `i32` limits.
    pub fn around(year: i32, window: u32) -> Self {
        let window = i32::try_from(window).unwrap_or(i32::MAX);
        PlanYearRange {
            min: year.saturating_sub(window),
            max: year.saturating_add(window),
        }
    }

    /// Current UTC year plus or minus `window`.
    pub fn current(window: u32) -> Self {
        Self::around(Utc::now().year(), window)
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntake {
    pub client_name: String,
    pub requestor_name: String,
    pub payroll_storage_url: String,
    pub plan_year: i32,
    pub guide_type: GuideType,
    pub communications_add_ons: CommunicationsAddOns,
    pub requested_production_time: ProductionTime,
    pub notes_general: Option<String>,
    pub sections_changed_flags: SectionFlags,
    pub sections_included_flags: SectionFlags,
}

/// The parsed value of a lenient field, or a field error naming what was sent.
fn parsed<T: Copy>(
    field: &str,
    label: &str,
    value: &Option<FieldValue<T>>,
    field_errors: &mut BTreeMap<String, String>,
) -> Option<T> {
    match value.as_ref()? {
        FieldValue::Valid(value) => Some(*value),
        FieldValue::Invalid(raw) => {
            field_errors.insert(field.to_string(), format!("Invalid {}: {}", label, raw));
            None
        }
    }
}

pub fn validate_create_request(
    req: &CreateIntakeRequest,
    plan_years: PlanYearRange,
) -> Result<ValidatedIntake, AppError> {
    let mut field_errors = match req.validate() {
        Ok(()) => Default::default(),
        Err(errors) => collect_field_errors(&errors),
    };

    let plan_year = match req.plan_year.as_ref() {
        Some(FieldValue::Valid(year)) if !plan_years.contains(*year) => {
            field_errors.insert(
                "planYear".to_string(),
                format!(
                    "Plan year must be between {} and {}",
                    plan_years.min, plan_years.max
                ),
            );
            None
        }
        Some(FieldValue::Valid(year)) => Some(*year),
        Some(FieldValue::Invalid(_)) => {
            field_errors.insert(
                "planYear".to_string(),
                "Plan year must be an integer".to_string(),
            );
            None
        }
        None => None,
    };
    let guide_type = parsed("guideType", "guide type", &req.guide_type, &mut field_errors);
    let communications_add_ons = parsed(
        "communicationsAddOns",
        "communications add-ons",
        &req.communications_add_ons,
        &mut field_errors,
    );
    let production_time = parsed(
        "requestedProductionTime",
        "requested production time",
        &req.requested_production_time,
        &mut field_errors,
    );

    let (Some(plan_year), Some(guide_type), Some(communications_add_ons), Some(production_time)) =
        (plan_year, guide_type, communications_add_ons, production_time)
    else {
        return Err(AppError::validation(field_errors));
    };

    if !field_errors.is_empty() {
        return Err(AppError::validation(field_errors));
    }

    let notes_general = req
        .notes_general
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);

    Ok(ValidatedIntake {
        client_name: req.client_name.trim().to_string(),
        requestor_name: req.requestor_name.trim().to_string(),
        payroll_storage_url: req.payroll_storage_url.trim().to_string(),
        plan_year,
        guide_type,
        communications_add_ons,
        requested_production_time: production_time,
        notes_general,
        sections_changed_flags: req
            .sections_changed_flags
            .as_ref()
            .map(|partial| SectionFlags::with_defaults(partial, false))
            .unwrap_or_else(SectionFlags::none_changed),
        sections_included_flags: req
            .sections_included_flags
            .as_ref()
            .map(|partial| SectionFlags::with_defaults(partial, true))
            .unwrap_or_else(SectionFlags::all_included),
    })
}
