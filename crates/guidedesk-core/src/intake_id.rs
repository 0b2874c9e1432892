//! Human-readable intake identifiers: `EG-<year>-<4 base36 chars>`.
//!
//! The generator only guarantees the format. Uniqueness is enforced by the
//! document store, which rejects a duplicate id on insert.

use chrono::{Datelike, Utc};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

pub const INTAKE_ID_PREFIX: &str = "EG";
pub const SUFFIX_LEN: usize = 4;
const BASE36_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// 36^4 possible suffixes per year.
pub const SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

/// Generate an id for the current UTC year.
pub fn generate_intake_id() -> String {
    let mut rng = rand::rng();
    generate_intake_id_for_year(Utc::now().year(), &mut rng)
}

pub fn generate_intake_id_for_year<R: Rng + ?Sized>(year: i32, rng: &mut R) -> String {
    let value = rng.random_range(0..SUFFIX_SPACE);
    format!("{}-{:04}-{}", INTAKE_ID_PREFIX, year, encode_base36(value))
}

/// Encode `value` as uppercase base36, left-padded with zeros to four characters.
fn encode_base36(mut value: u32) -> String {
    let mut buf = [b'0'; SUFFIX_LEN];
    for slot in buf.iter_mut().rev() {
        *slot = BASE36_DIGITS[(value % 36) as usize];
        value /= 36;
    }
    buf.iter().map(|b| *b as char).collect()
}

fn intake_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^EG-\d{4}-[0-9A-Z]{4}$").expect("intake id pattern is a valid regex")
    })
}

pub fn is_valid_intake_id(id: &str) -> bool {
    intake_id_regex().is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_id_format() {
        for _ in 0..200 {
            let id = generate_intake_id();
            assert!(is_valid_intake_id(&id), "bad id {}", id);
        }
        let year = Utc::now().year();
        assert!(generate_intake_id().starts_with(&format!("EG-{}-", year)));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(
            generate_intake_id_for_year(2026, &mut a),
            generate_intake_id_for_year(2026, &mut b)
        );
    }

    #[test]
    fn test_base36_padding() {
        assert_eq!(encode_base36(0), "0000");
        assert_eq!(encode_base36(35), "000Z");
        assert_eq!(encode_base36(36), "0010");
        assert_eq!(encode_base36(SUFFIX_SPACE - 1), "ZZZZ");
    }

    #[test]
    fn test_validation_rejects_malformed_ids() {
        assert!(is_valid_intake_id("EG-2026-0A1Z"));
        assert!(!is_valid_intake_id("EG-2026-0a1z"));
        assert!(!is_valid_intake_id("EG-26-0A1Z"));
        assert!(!is_valid_intake_id("XX-2026-0A1Z"));
        assert!(!is_valid_intake_id("EG-2026-0A1Z9"));
    }
}
