// src/tibia/transport.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, RequestBuilder, StatusCode};
use tracing::{debug, error, warn};

use crate::tibia::config::ClientConfig;
use crate::utils::error::NetworkError;

/// A fetched document plus the cache metadata the site sent with it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub content: String,
    pub status: u16,
    /// `CF-Cache-Status: HIT`.
    pub cached: bool,
    /// Seconds the cached copy had been alive, from the `Age` header.
    pub age: u64,
    pub fetching_time: Duration,
    pub timestamp: DateTime<Utc>,
}

impl RawResponse {
    /// A fresh, uncached response; mostly useful for fakes.
    pub fn new(content: impl Into<String>) -> Self {
        RawResponse {
            content: content.into(),
            status: 200,
            cached: false,
            age: 0,
            fetching_time: Duration::ZERO,
            timestamp: Utc::now(),
        }
    }
}

/// The HTTP seam of the client. No retries happen at this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, NetworkError>;

    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<RawResponse, NetworkError>;
}

/// `Transport` over a single pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(ReqwestTransport { client })
    }

    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<RawResponse, NetworkError> {
        let start = Instant::now();
        let response = request
            .header(header::ACCEPT, "text/html,application/json,*/*")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!("Received 403 Forbidden for {}: probably rate limited", url);
            return Err(NetworkError::Forbidden);
        }
        if status.is_client_error() || status.is_server_error() {
            error!("HTTP error status: {} for URL: {}", status, url);
            return Err(NetworkError::Status(status));
        }

        let headers = response.headers();
        let cached = headers
            .get("CF-Cache-Status")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("HIT"));
        let age = headers
            .get(header::AGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        let content = response.text().await.map_err(|e| NetworkError::Decode(e.to_string()))?;
        let fetching_time = start.elapsed();
        debug!("Fetched {} bytes from {} in {:?} (cached: {}, age: {})", content.len(), url, fetching_time, cached, age);

        Ok(RawResponse {
            content,
            status: status.as_u16(),
            cached,
            age,
            fetching_time,
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, NetworkError> {
        self.execute(self.client.get(url), url).await
    }

    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<RawResponse, NetworkError> {
        self.execute(self.client.post(url).form(form), url).await
    }
}
