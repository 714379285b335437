//! Remote summarizer client.
//!
//! Posts the extracted page text to an external service and takes back
//! pre-rendered summary markup.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RemoteConfig;
use crate::summary::Summary;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("summarizer request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("summarizer returned status {0}")]
    Status(u16),
    #[error("failed to parse summarizer response: {0}")]
    ParseError(String),
    #[error("no summarizer endpoint configured")]
    NotConfigured,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

/// HTTP client for a `POST /summarize` service
#[derive(Debug, Clone)]
pub struct RemoteSummarizer {
    client: Client,
    url: String,
}

impl RemoteSummarizer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;
        let url = format!("{}/summarize", endpoint.trim_end_matches('/'));
        Ok(Self { client, url })
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or(RemoteError::NotConfigured)?;
        Self::new(endpoint, Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `content` to the service and parse the returned markup
    pub async fn summarize(&self, content: &str) -> Result<Summary, RemoteError> {
        info!(url = %self.url, chars = content.len(), "requesting remote summary");

        let response = self
            .client
            .post(&self.url)
            .json(&SummarizeRequest { content })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "summarizer rejected request");
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SummarizeResponse = serde_json::from_str(&body)
            .map_err(|e| RemoteError::ParseError(format!("{}: {}", e, body)))?;

        Ok(Summary::from_markup(&parsed.summary))
    }
}
