use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "guidedesk=debug,tower_http=debug";

/// Initialize tracing. Production environments log JSON lines; everything
/// else uses the human-readable formatter. `RUST_LOG` overrides the filter.
pub fn init_telemetry(
    service_name: &str,
    environment: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = matches!(environment.to_lowercase().as_str(), "production" | "prod");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    tracing::info!(
        service = service_name,
        environment = environment,
        json,
        "Tracing initialized"
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
