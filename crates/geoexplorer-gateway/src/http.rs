use async_trait::async_trait;
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::error::{ExplorerError, Result};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;

use crate::ports::{Gateway, Params};

/// Gateway backed by the backend's REST API
#[derive(Debug, Clone)]
pub struct RestGateway {
    /// API root (e.g., "http://localhost:8080/api/v1")
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl RestGateway {
    /// Create a gateway with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            ExplorerError::ConfigInvalid {
                key: "api_url".to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), client })
    }

    /// Create a gateway from the resolved configuration
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        Self::new(
            config.api_url.value.clone(),
            Duration::from_secs(config.request_timeout_secs.value),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a resource path against the API root
    pub fn url(&self, path: &str, params: Params<'_>) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| ExplorerError::ConfigInvalid {
            key: "api_url".to_string(),
            reason: format!("Invalid URL '{}': {}", raw, e),
        })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Open a long-lived streaming request without the client timeout
    pub(crate) async fn open_stream(&self, url: Url) -> Result<reqwest::Response> {
        // A fresh client so the stream is not cut off by the request timeout
        let response = reqwest::Client::new()
            .get(url.clone())
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(network_failure)?;
        check_status(response, url.path()).await
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value> {
        let response = request.send().await.map_err(network_failure)?;
        let response = check_status(response, path).await?;

        let body = response.text().await.map_err(network_failure)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            ExplorerError::Serialization(format!("Failed to parse response from {}: {}", path, e))
        })
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value> {
        tracing::debug!("GET {}", path);
        let url = self.url(path, params)?;
        self.send(self.client.get(url), path).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        tracing::debug!("POST {}", path);
        let url = self.url(path, &[])?;
        self.send(self.client.post(url).json(body), path).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        tracing::debug!("PUT {}", path);
        let url = self.url(path, &[])?;
        self.send(self.client.put(url).json(body), path).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        tracing::debug!("DELETE {}", path);
        let url = self.url(path, &[])?;
        self.send(self.client.delete(url), path).await
    }
}

fn network_failure(e: reqwest::Error) -> ExplorerError {
    ExplorerError::NetworkFailure {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

async fn check_status(response: reqwest::Response, path: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ExplorerError::not_found(path.trim_start_matches('/')));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ExplorerError::NetworkFailure { status: Some(status.as_u16()), message });
    }
    Ok(response)
}
