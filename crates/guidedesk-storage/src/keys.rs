//! Shared key generation for storage backends.
//!
//! Key format: `intakes/{intake_id}/{upload_id}-{filename}`.

use uuid::Uuid;

const MAX_FILENAME_LEN: usize = 120;

/// Prefix under which every file of one intake is stored.
pub fn intake_prefix(intake_id: &str) -> String {
    format!("intakes/{}/", intake_id)
}

/// Generate the storage key for an upload.
pub fn upload_key(intake_id: &str, upload_id: Uuid, original_name: &str) -> String {
    format!(
        "{}{}-{}",
        intake_prefix(intake_id),
        upload_id,
        sanitize_filename(original_name)
    )
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; replace everything else with `_`.
///
/// Leading dots are dropped so the result can never be `..` or a hidden file.
/// An empty result becomes `file`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let truncated: String = trimmed.chars().take(MAX_FILENAME_LEN).collect();
    if truncated.is_empty() {
        "file".to_string()
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            upload_key("EG-2026-00AZ", id, "Plan Summary (final).pdf"),
            "intakes/EG-2026-00AZ/00000000-0000-0000-0000-000000000000-Plan_Summary__final_.pdf"
        );
    }

    #[test]
    fn test_sanitize_strips_paths_and_dots() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\guide.docx"), "guide.docx");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(".env"), "env");
        assert_eq!(sanitize_filename(""), "file");
    }
}
