//! Configuration module
//!
//! Server, storage and repository settings read from the environment (and an
//! optional `.env` file).

use std::env;

use crate::storage_types::StorageBackend;
use crate::validation::PlanYearRange;
use crate::workflow::StatusTransitionPolicy;

const SERVER_PORT: u16 = 4000;
const PLAN_YEAR_WINDOW: u32 = 10;
const INTAKE_ID_MAX_ATTEMPTS: u32 = 5;
const RECENT_WINDOW_DAYS: i64 = 7;
const MAX_PLAN_YEAR_WINDOW: u32 = 100;
const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;
const MAX_UPLOAD_SIZE_MB: usize = 25;
const LOCAL_STORAGE_PATH: &str = "./data/uploads";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:4000/files";

/// Rules applied by the intake repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryPolicy {
    /// Accepted plan years are the current year plus or minus this many years.
    pub plan_year_window: u32,
    pub transition_policy: StatusTransitionPolicy,
    /// How many ids `create` tries before surfacing a conflict.
    pub intake_id_max_attempts: u32,
    /// Trailing window counted by `recent_count` in stats.
    pub recent_window_days: i64,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        RepositoryPolicy {
            plan_year_window: PLAN_YEAR_WINDOW,
            transition_policy: StatusTransitionPolicy::default(),
            intake_id_max_attempts: INTAKE_ID_MAX_ATTEMPTS,
            recent_window_days: RECENT_WINDOW_DAYS,
        }
    }
}

impl RepositoryPolicy {
    pub fn plan_years(&self) -> PlanYearRange {
        PlanYearRange::current(self.plan_year_window)
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub repository: RepositoryPolicy,
    pub storage_backend: StorageBackend,
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    pub max_upload_size_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let transition_policy = match env::var("STATUS_TRANSITION_POLICY") {
            Ok(value) => value.parse::<StatusTransitionPolicy>()?,
            Err(_) => StatusTransitionPolicy::default(),
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let max_upload_size_mb = env::var("MAX_UPLOAD_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(SERVER_PORT),
            environment,
            cors_origins,
            repository: RepositoryPolicy {
                plan_year_window: env::var("PLAN_YEAR_WINDOW")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(PLAN_YEAR_WINDOW),
                transition_policy,
                intake_id_max_attempts: env::var("INTAKE_ID_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(INTAKE_ID_MAX_ATTEMPTS),
                recent_window_days: env::var("RECENT_WINDOW_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(RECENT_WINDOW_DAYS),
            },
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| LOCAL_STORAGE_BASE_URL.to_string()),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.repository.intake_id_max_attempts == 0 {
            return Err(anyhow::anyhow!("INTAKE_ID_MAX_ATTEMPTS must be at least 1"));
        }

        if !(0..=MAX_RECENT_WINDOW_DAYS).contains(&self.repository.recent_window_days) {
            return Err(anyhow::anyhow!(
                "RECENT_WINDOW_DAYS must be between 0 and {}",
                MAX_RECENT_WINDOW_DAYS
            ));
        }

        if self.repository.plan_year_window > MAX_PLAN_YEAR_WINDOW {
            return Err(anyhow::anyhow!(
                "PLAN_YEAR_WINDOW must be at most {}",
                MAX_PLAN_YEAR_WINDOW
            ));
        }

        if self.storage_backend == StorageBackend::Local
            && self.local_storage_path.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            repository: RepositoryPolicy::default(),
            storage_backend: StorageBackend::Local,
            local_storage_path: LOCAL_STORAGE_PATH.to_string(),
            local_storage_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
        }
    }
}
