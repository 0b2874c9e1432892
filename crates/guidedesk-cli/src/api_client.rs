//! Minimal HTTP client for the guidedesk API.

use anyhow::{Context, Result};
use guidedesk_core::models::IntakeStats;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:4000";
pub const API_PREFIX: &str = "/api/v0";

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: GUIDEDESK_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("GUIDEDESK_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send_get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.build_url(path);
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        tracing::debug!(url = %url, "GET");
        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }
        Ok(response)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.send_get(path, query)
            .await?
            .json()
            .await
            .context("Failed to parse response as JSON")
    }

    /// GET request returning the raw body text.
    pub async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        self.send_get(path, query)
            .await?
            .text()
            .await
            .context("Failed to read response body")
    }

    pub async fn intake_stats(&self) -> Result<IntakeStats> {
        self.get("/intakes/stats", &[]).await
    }

    /// CSV export with the list filters and sort, as accepted by the API.
    pub async fn export_csv(&self, query: &[(&str, String)]) -> Result<String> {
        self.get_text("/intakes/export.csv", query).await
    }
}
