use anyhow::{Context, Result};
use reqwest;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::config::ApiConfig;
use crate::payload::{BatchAnalyzeRequest, ShipmentSummary, TrainRequest};

/// Status code and undecoded body of an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body. Fails when the server did not send JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).with_context(|| {
            format!(
                "response body is not valid JSON (status {}): {}",
                self.status,
                preview(&self.body)
            )
        })
    }
}

fn preview(body: &str) -> String {
    const MAX: usize = 120;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}

/// The remote sustainability service as seen by the driver.
pub trait SustainabilityApi {
    fn train(&self, request: &TrainRequest<'_>) -> Result<ApiResponse>;

    fn batch_analyze(&self, request: &BatchAnalyzeRequest<'_>) -> Result<ApiResponse>;

    fn analyze(&self, shipment: &ShipmentSummary) -> Result<ApiResponse>;

    /// Ask whether training has finished. Only called when readiness
    /// polling is enabled.
    fn training_status(&self) -> Result<ApiResponse>;
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        // No timeout unless one is configured
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout_secs.map(Duration::from_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = self.endpoint(path);
        debug!(target: "api", "POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .with_context(|| format!("POST {} failed", url))?;

        self.finish(&url, "POST", response)
    }

    fn get(&self, path: &str) -> Result<ApiResponse> {
        let url = self.endpoint(path);
        debug!(target: "api", "GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("GET {} failed", url))?;

        self.finish(&url, "GET", response)
    }

    fn finish(
        &self,
        url: &str,
        method: &str,
        response: reqwest::blocking::Response,
    ) -> Result<ApiResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .with_context(|| format!("failed to read response body from {}", url))?;

        info!(target: "api", "{} {} -> {} ({} bytes)", method, url, status, body.len());
        Ok(ApiResponse { status, body })
    }
}

impl SustainabilityApi for ApiClient {
    fn train(&self, request: &TrainRequest<'_>) -> Result<ApiResponse> {
        self.post_json(&self.config.train_path, request)
    }

    fn batch_analyze(&self, request: &BatchAnalyzeRequest<'_>) -> Result<ApiResponse> {
        self.post_json(&self.config.batch_analyze_path, request)
    }

    fn analyze(&self, shipment: &ShipmentSummary) -> Result<ApiResponse> {
        self.post_json(&self.config.analyze_path, shipment)
    }

    fn training_status(&self) -> Result<ApiResponse> {
        let path = self
            .config
            .status_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no training status endpoint configured"))?;
        self.get(path)
    }
}
