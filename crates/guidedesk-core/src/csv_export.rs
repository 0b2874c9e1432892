//! CSV rendering of intake collections
//!
//! Rows are emitted in the order given; sort with [`crate::listing::apply`]
//! first.

use chrono::{NaiveDate, SecondsFormat};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::AppError;
use crate::models::Intake;

pub const HEADERS: [&str; 13] = [
    "Intake ID",
    "Client Name",
    "Plan Year",
    "Requestor Name",
    "Status",
    "Complexity Band",
    "Complexity Score",
    "Guide Type",
    "Communications Add-ons",
    "Requested Production Time",
    "Date Received",
    "Payroll Storage URL",
    "General Notes",
];

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn row(intake: &Intake) -> [String; 13] {
    [
        intake.intake_id.clone(),
        intake.client_name.clone(),
        intake.plan_year.to_string(),
        intake.requestor_name.clone(),
        intake.status.as_str().to_string(),
        intake.complexity_band.as_str().to_string(),
        intake.complexity_score.to_string(),
        intake.guide_type.as_str().to_string(),
        intake.communications_add_ons.as_str().to_string(),
        intake.requested_production_time.as_str().to_string(),
        intake
            .date_received
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        intake.payroll_storage_url.clone(),
        intake.notes_general.clone().unwrap_or_default(),
    ]
}

fn write_error(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Failed to write CSV: {}", e))
}

/// Header line plus one line per intake, separated by `\n` with no trailing
/// newline.
///
/// Fields containing a comma, double quote or line break are quoted, with
/// inner quotes doubled.
pub fn to_csv(intakes: &[Intake]) -> Result<String, AppError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS).map_err(write_error)?;
    for intake in intakes {
        writer.write_record(row(intake)).map_err(write_error)?;
    }

    let bytes = writer.into_inner().map_err(write_error)?;
    let mut out = String::from_utf8(bytes).map_err(write_error)?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// `intakes-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("intakes-{}.csv", date.format("%Y-%m-%d"))
}
