//! Command-line clients for the guidedesk API.
//!
//! Set GUIDEDESK_API_URL (default `http://localhost:4000`).

pub mod api_client;

/// Initialize tracing for CLI binaries. Logs go to stderr so command output
/// can be piped.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
