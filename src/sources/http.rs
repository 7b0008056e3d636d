//! Rate-limited HTTP access shared by the dataset adapters

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::error::SourceError;
use crate::sources::descriptor::SourceDescriptor;
use crate::sources::traits::{Fetcher, RawRecord};

const USER_AGENT: &str = concat!("linked-art-gateway/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide reqwest client
pub fn build_client(timeout: Duration) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// HTTP access to one dataset, spacing requests at least `min_interval` apart
#[derive(Debug)]
pub struct DatasetClient {
    client: Client,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl DatasetClient {
    pub fn new(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Enforce rate limiting between requests
    async fn rate_limit(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        // Held across the sleep so concurrent callers queue up
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send a request and decode JSON; 404 and 410 yield `None`
    pub async fn send_json_opt(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<Value>, SourceError> {
        self.rate_limit().await;
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        let text = response.text().await?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Send a request and decode JSON; any non-success status is an error
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value, SourceError> {
        self.rate_limit().await;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request and return the body as text
    pub async fn send_text(&self, request: RequestBuilder) -> Result<String, SourceError> {
        self.rate_limit().await;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Fetches JSON payloads by filling the descriptor's fetch template
#[derive(Debug)]
pub struct HttpFetcher {
    descriptor: SourceDescriptor,
    http: DatasetClient,
}

impl HttpFetcher {
    pub fn new(descriptor: SourceDescriptor, http: DatasetClient) -> Self {
        Self { descriptor, http }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, identifier: &str) -> Result<Option<RawRecord>, SourceError> {
        let url = self.descriptor.fetch_uri(identifier);
        tracing::debug!(dataset = %self.descriptor.name, %url, "Fetching record");

        let data = self.http.send_json_opt(self.http.get(&url)).await?;
        Ok(data.map(|data| RawRecord::new(data, identifier, &self.descriptor.name)))
    }
}
