//! Validation modules

pub mod intake;

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{ValidationError, ValidationErrors};

pub use intake::{validate_create_request, PlanYearRange, ValidatedIntake};

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed("is required")));
    }
    Ok(())
}

/// `plan_year` -> `planYear`
pub fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Flatten validator errors into one message per camelCase field name.
///
/// Only the first error of each field is kept. A message starting with a
/// lowercase word is prefixed with the field name.
pub fn collect_field_errors(errors: &ValidationErrors) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let name = to_camel_case(&field);
        let Some(first) = field_errors.first() else {
            continue;
        };
        let message = match first.message.as_deref() {
            Some(msg) if msg.starts_with(|c: char| c.is_lowercase()) => {
                format!("{} {}", name, msg)
            }
            Some(msg) => msg.to_string(),
            None => format!("{} is invalid", name),
        };
        out.insert(name, message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Acme").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("  \t ").is_err());
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("plan_year"), "planYear");
        assert_eq!(to_camel_case("payroll_storage_url"), "payrollStorageUrl");
        assert_eq!(to_camel_case("status"), "status");
    }
}
