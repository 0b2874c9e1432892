//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs against the in-memory document store and `MemoryStorage`,
//! so no external services are needed: `cargo test -p guidedesk-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{Datelike, Utc};
use guidedesk_api::constants;
use guidedesk_api::setup::{build_state, routes};
use guidedesk_api::state::AppState;
use guidedesk_core::{Config, StorageBackend};
use guidedesk_storage::MemoryStorage;
use serde_json::{json, Value};
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<MemoryStorage>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> Config {
    Config {
        storage_backend: StorageBackend::Memory,
        ..Config::default()
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: Config) -> TestApp {
    let storage = Arc::new(MemoryStorage::new());
    let state = build_state(config, storage.clone());
    let router = routes::setup_routes(state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");
    TestApp {
        server,
        state,
        storage,
    }
}

/// A valid create body; override fields with `merge`.
pub fn intake_body(client_name: &str) -> Value {
    json!({
        "clientName": client_name,
        "requestorName": "Dana Reyes",
        "payrollStorageUrl": "https://files.example.com/payroll",
        "planYear": Utc::now().year(),
        "guideType": "UPDATE_EXISTING_GUIDE",
        "communicationsAddOns": "NONE",
        "requestedProductionTime": "STANDARD"
    })
}

pub fn merge(mut base: Value, overrides: Value) -> Value {
    if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
        for (k, v) in overrides {
            base.insert(k.clone(), v.clone());
        }
    }
    base
}

/// Create an intake and return its id.
pub async fn create_intake(client: &TestServer, body: Value) -> String {
    let res = client.post(&api_path("/intakes")).json(&body).await;
    assert_eq!(res.status_code(), 201, "create intake: {}", res.text());
    let created: Value = res.json();
    created["intakeId"]
        .as_str()
        .expect("intakeId in response")
        .to_string()
}
