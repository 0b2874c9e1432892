//! Complexity scoring
//!
//! An intake's score is one point per changed section, plus a fixed bonus for a
//! new guide build and for the communications add-ons that require extra
//! deliverables. The band is a pure function of the score:
//!
//! | Score  | Band    |
//! |--------|---------|
//! | 0-3    | Minimal |
//! | 4-8    | Low     |
//! | 9-15   | Medium  |
//! | 16+    | High    |

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CommunicationsAddOns, ComplexityBand, GuideType, SectionFlags};

pub const NEW_GUIDE_BUILD_POINTS: u32 = 15;
pub const OE_LETTER_POINTS: u32 = 3;
pub const OE_PRESENTATION_POINTS: u32 = 5;
pub const BOTH_ADD_ONS_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Complexity {
    pub score: u32,
    pub band: ComplexityBand,
}

pub fn guide_type_points(guide_type: Option<GuideType>) -> u32 {
    match guide_type {
        Some(GuideType::NewGuideBuild) => NEW_GUIDE_BUILD_POINTS,
        Some(GuideType::UpdateExistingGuide) | None => 0,
    }
}

pub fn add_on_points(add_ons: Option<CommunicationsAddOns>) -> u32 {
    match add_ons {
        Some(CommunicationsAddOns::OeLetter) => OE_LETTER_POINTS,
        Some(CommunicationsAddOns::OePresentation) => OE_PRESENTATION_POINTS,
        Some(CommunicationsAddOns::Both) => BOTH_ADD_ONS_POINTS,
        Some(CommunicationsAddOns::None) | Some(CommunicationsAddOns::Other) | None => 0,
    }
}

/// Score an intake from its changed sections, guide type and add-ons.
pub fn calculate_complexity(
    sections_changed: &SectionFlags,
    guide_type: Option<GuideType>,
    add_ons: Option<CommunicationsAddOns>,
) -> Complexity {
    let score =
        sections_changed.count_true() + guide_type_points(guide_type) + add_on_points(add_ons);
    Complexity {
        score,
        band: ComplexityBand::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionCode;
    use proptest::prelude::*;

    fn flags(codes: &[SectionCode]) -> SectionFlags {
        let mut flags = SectionFlags::none_changed();
        for code in codes {
            flags.set(*code, true);
        }
        flags
    }

    #[test]
    fn test_empty_flags_no_factors() {
        let c = calculate_complexity(&SectionFlags::none_changed(), None, None);
        assert_eq!(c.score, 0);
        assert_eq!(c.band, ComplexityBand::Minimal);
    }

    #[test]
    fn test_two_sections_new_guide_is_high() {
        let c = calculate_complexity(
            &flags(&[SectionCode::C, SectionCode::D]),
            Some(GuideType::NewGuideBuild),
            None,
        );
        assert_eq!(c.score, 17);
        assert_eq!(c.band, ComplexityBand::High);
    }

    #[test]
    fn test_single_section_update_existing_is_minimal() {
        let c = calculate_complexity(
            &flags(&[SectionCode::B]),
            Some(GuideType::UpdateExistingGuide),
            Some(CommunicationsAddOns::None),
        );
        assert_eq!(c.score, 1);
        assert_eq!(c.band, ComplexityBand::Minimal);
    }

    #[test]
    fn test_add_on_points() {
        let none = SectionFlags::none_changed();
        let score = |a| calculate_complexity(&none, None, Some(a)).score;
        assert_eq!(score(CommunicationsAddOns::OeLetter), 3);
        assert_eq!(score(CommunicationsAddOns::OePresentation), 5);
        assert_eq!(score(CommunicationsAddOns::Both), 10);
        assert_eq!(score(CommunicationsAddOns::None), 0);
        assert_eq!(score(CommunicationsAddOns::Other), 0);
    }

    #[test]
    fn test_all_sections_changed() {
        let c = calculate_complexity(&SectionFlags::all(true), None, None);
        assert_eq!(c.score, 17);
        assert_eq!(c.band, ComplexityBand::High);
    }

    #[test]
    fn test_band_boundaries_through_sections() {
        let cases = [
            (3, ComplexityBand::Minimal),
            (4, ComplexityBand::Low),
            (8, ComplexityBand::Low),
            (9, ComplexityBand::Medium),
            (15, ComplexityBand::Medium),
            (16, ComplexityBand::High),
        ];
        for (count, band) in cases {
            let codes: Vec<SectionCode> = SectionCode::ALL.iter().copied().take(count).collect();
            let c = calculate_complexity(&flags(&codes), None, None);
            assert_eq!(c.score, count as u32);
            assert_eq!(c.band, band, "score {}", count);
        }
    }

    fn guide_type_strategy() -> impl Strategy<Value = Option<GuideType>> {
        prop_oneof![
            Just(None),
            Just(Some(GuideType::UpdateExistingGuide)),
            Just(Some(GuideType::NewGuideBuild)),
        ]
    }

    fn add_ons_strategy() -> impl Strategy<Value = Option<CommunicationsAddOns>> {
        prop_oneof![
            Just(None),
            Just(Some(CommunicationsAddOns::None)),
            Just(Some(CommunicationsAddOns::OeLetter)),
            Just(Some(CommunicationsAddOns::OePresentation)),
            Just(Some(CommunicationsAddOns::Both)),
            Just(Some(CommunicationsAddOns::Other)),
        ]
    }

    proptest! {
        #[test]
        fn prop_superset_never_scores_lower(
            base in proptest::collection::vec(any::<bool>(), 17),
            extra in proptest::collection::vec(any::<bool>(), 17),
            guide_type in guide_type_strategy(),
            add_ons in add_ons_strategy(),
        ) {
            let mut subset = SectionFlags::none_changed();
            let mut superset = SectionFlags::none_changed();
            for (i, code) in SectionCode::ALL.iter().enumerate() {
                subset.set(*code, base[i]);
                superset.set(*code, base[i] || extra[i]);
            }
            let small = calculate_complexity(&subset, guide_type, add_ons);
            let large = calculate_complexity(&superset, guide_type, add_ons);
            prop_assert!(large.score >= small.score);
            prop_assert!(large.band.rank() >= small.band.rank());
        }

        #[test]
        fn prop_new_guide_never_scores_lower(
            changed in proptest::collection::vec(any::<bool>(), 17),
            add_ons in add_ons_strategy(),
        ) {
            let mut flags = SectionFlags::none_changed();
            for (i, code) in SectionCode::ALL.iter().enumerate() {
                flags.set(*code, changed[i]);
            }
            let update = calculate_complexity(&flags, Some(GuideType::UpdateExistingGuide), add_ons);
            let build = calculate_complexity(&flags, Some(GuideType::NewGuideBuild), add_ons);
            prop_assert_eq!(build.score, update.score + NEW_GUIDE_BUILD_POINTS);
            prop_assert!(build.band.rank() >= update.band.rank());
        }
    }
}
