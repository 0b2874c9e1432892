use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

/// One of the 17 fixed guide sections, `A` through `Q`.
///
/// Ordering follows the letter, so a `BTreeMap` keyed by `SectionCode` iterates
/// in the same order as a lexicographic sort of the codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum SectionCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
}

impl SectionCode {
    /// Every section code in ascending order.
    pub const ALL: [SectionCode; 17] = [
        SectionCode::A,
        SectionCode::B,
        SectionCode::C,
        SectionCode::D,
        SectionCode::E,
        SectionCode::F,
        SectionCode::G,
        SectionCode::H,
        SectionCode::I,
        SectionCode::J,
        SectionCode::K,
        SectionCode::L,
        SectionCode::M,
        SectionCode::N,
        SectionCode::O,
        SectionCode::P,
        SectionCode::Q,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionCode::A => "A",
            SectionCode::B => "B",
            SectionCode::C => "C",
            SectionCode::D => "D",
            SectionCode::E => "E",
            SectionCode::F => "F",
            SectionCode::G => "G",
            SectionCode::H => "H",
            SectionCode::I => "I",
            SectionCode::J => "J",
            SectionCode::K => "K",
            SectionCode::L => "L",
            SectionCode::M => "M",
            SectionCode::N => "N",
            SectionCode::O => "O",
            SectionCode::P => "P",
            SectionCode::Q => "Q",
        }
    }
}

impl Display for SectionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionCode {
    type Err = AppError;

    /// Accepts exactly one uppercase letter in `A..=Q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Invalid section code '{}': expected a single letter A-Q",
                    s
                ))
            })
    }
}

/// Flags supplied by a caller for some subset of sections.
pub type PartialSectionFlags = BTreeMap<SectionCode, bool>;

/// Boolean flag for every one of the 17 sections.
///
/// Always holds an entry for each code. Deserializing a partial map fills the
/// missing codes with `false`; callers that need a different default build the
/// value with [`SectionFlags::with_defaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionFlags(BTreeMap<SectionCode, bool>);

impl SectionFlags {
    pub fn all(value: bool) -> Self {
        SectionFlags(SectionCode::ALL.iter().map(|c| (*c, value)).collect())
    }

    /// Default for `sectionsChangedFlags`: nothing changed.
    pub fn none_changed() -> Self {
        Self::all(false)
    }

    /// Default for `sectionsIncludedFlags`: every section included.
    pub fn all_included() -> Self {
        Self::all(true)
    }

    pub fn with_defaults(partial: &PartialSectionFlags, default: bool) -> Self {
        let mut flags = Self::all(default);
        for (code, value) in partial {
            flags.set(*code, *value);
        }
        flags
    }

    pub fn get(&self, code: SectionCode) -> bool {
        self.0.get(&code).copied().unwrap_or(false)
    }

    pub fn set(&mut self, code: SectionCode, value: bool) {
        self.0.insert(code, value);
    }

    /// Apply every entry of `partial`, leaving the other codes untouched.
    pub fn merge(&mut self, partial: &PartialSectionFlags) {
        for (code, value) in partial {
            self.set(*code, *value);
        }
    }

    pub fn count_true(&self) -> u32 {
        self.0.values().filter(|v| **v).count() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionCode, bool)> + '_ {
        self.0.iter().map(|(c, v)| (*c, *v))
    }
}

impl<'de> Deserialize<'de> for SectionFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let partial = PartialSectionFlags::deserialize(deserializer)?;
        Ok(SectionFlags::with_defaults(&partial, false))
    }
}

/// Free-text elaboration stored for one section of one intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_description: Option<String>,
}

/// Section detail document, unique per `(intake_id, section_code)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionDetail {
    pub intake_id: String,
    pub section_code: SectionCode,
    pub payload: SectionPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a bulk section creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSection {
    pub intake_id: String,
    pub section_code: SectionCode,
    #[serde(default)]
    pub payload: SectionPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct UpsertOutcome {
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResult {
    pub intake_id: String,
    pub section_code: SectionCode,
    pub created: bool,
}

/// Section supplied in a request body; the intake comes from the path.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    pub section_code: SectionCode,
    #[serde(default)]
    pub payload: SectionPayload,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkCreateSectionsRequest {
    pub sections: Vec<SectionInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_code_from_str() {
        assert_eq!("A".parse::<SectionCode>().unwrap(), SectionCode::A);
        assert_eq!("Q".parse::<SectionCode>().unwrap(), SectionCode::Q);
        assert!("R".parse::<SectionCode>().is_err());
        assert!("a".parse::<SectionCode>().is_err());
        assert!("AB".parse::<SectionCode>().is_err());
        assert!("".parse::<SectionCode>().is_err());
    }

    #[test]
    fn test_all_codes_sorted() {
        let mut sorted = SectionCode::ALL.to_vec();
        sorted.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(sorted, SectionCode::ALL.to_vec());
        assert_eq!(SectionCode::ALL.len(), 17);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(SectionFlags::none_changed().count_true(), 0);
        assert_eq!(SectionFlags::all_included().count_true(), 17);
    }

    #[test]
    fn test_with_defaults_fills_missing_codes() {
        let mut partial = PartialSectionFlags::new();
        partial.insert(SectionCode::C, false);
        let flags = SectionFlags::with_defaults(&partial, true);
        assert!(!flags.get(SectionCode::C));
        assert!(flags.get(SectionCode::A));
        assert_eq!(flags.count_true(), 16);
    }

    #[test]
    fn test_serde_shape() {
        let mut flags = SectionFlags::none_changed();
        flags.set(SectionCode::B, true);
        let json = serde_json::to_value(&flags).unwrap();
        assert_eq!(json["B"], serde_json::json!(true));
        assert_eq!(json["Q"], serde_json::json!(false));
        assert_eq!(json.as_object().unwrap().len(), 17);

        let parsed: SectionFlags = serde_json::from_str(r#"{"D": true}"#).unwrap();
        assert!(parsed.get(SectionCode::D));
        assert_eq!(parsed.count_true(), 1);

        let bad: Result<SectionFlags, _> = serde_json::from_str(r#"{"Z": true}"#);
        assert!(bad.is_err());
    }
}
