//! Application setup and initialization
//!
//! Everything `main` needs to go from a `Config` to a served router, split so
//! integration tests can build the same router around their own backends.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use guidedesk_core::Config;
use guidedesk_db::{IntakeRepository, MemoryDocumentStore, SectionStore, UploadRepository};
use guidedesk_storage::Storage;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    guidedesk_infra::init_telemetry("guidedesk-api", &config.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        transition_policy = %config.repository.transition_policy,
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let state = build_state(config, storage);
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}

/// Wire repositories over an in-memory document store and the given storage.
pub fn build_state(config: Config, storage: Arc<dyn Storage>) -> Arc<AppState> {
    let documents = Arc::new(MemoryDocumentStore::new());
    let intakes = IntakeRepository::new(
        documents.clone(),
        SectionStore::new(documents.clone()),
        UploadRepository::new(documents, storage.clone()),
        config.repository.clone(),
    );
    Arc::new(AppState::new(config, intakes, storage))
}
