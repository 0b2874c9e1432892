//! Shared application state

use guidedesk_core::Config;
use guidedesk_db::IntakeRepository;
use guidedesk_storage::Storage;
use std::sync::Arc;

/// State handed to every handler as `State<Arc<AppState>>`.
pub struct AppState {
    pub intakes: IntakeRepository,
    pub storage: Arc<dyn Storage>,
    pub config: Config,
    pub is_production: bool,
}

impl AppState {
    pub fn new(config: Config, intakes: IntakeRepository, storage: Arc<dyn Storage>) -> Self {
        let is_production = config.is_production();
        Self {
            intakes,
            storage,
            config,
            is_production,
        }
    }
}
