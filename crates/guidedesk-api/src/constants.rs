//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

pub const API_VERSION: &str = "v0";

/// Versioned prefix every resource route is mounted under.
pub const API_PREFIX: &str = "/api/v0";

/// Multipart framing allowance on top of the configured upload size, so an
/// oversized file reaches the handler and gets a JSON 413.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Timeout for each dependency probe in the health check.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;
