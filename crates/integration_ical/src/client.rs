//! Feed HTTP client
//!
//! Downloads the iCalendar feed and streams the body straight into the
//! cache file.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, instrument};

/// Feed client errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// The HTTP client could not be built
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request or the body transfer failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The feed host answered with a non-success status
    #[error("Feed returned HTTP {0}")]
    HttpStatus(u16),

    /// The destination file could not be written
    #[error("Failed to write {path}: {message}")]
    Io { path: String, message: String },
}

/// Feed client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedClientConfig {
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("rooster/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Downloads a feed into a file
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// GET `url` and write the body to `destination`, returning the bytes written
    ///
    /// The destination is only created or truncated once the response status
    /// is known to be a success.
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FeedError>;
}

/// reqwest-backed feed client
#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    config: FeedClientConfig,
}

impl HttpFeedClient {
    /// Create a client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FeedError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn map_request_error(&self, err: &reqwest::Error) -> FeedError {
        if err.is_timeout() {
            FeedError::Timeout(self.config.timeout_secs)
        } else {
            FeedError::RequestFailed(err.to_string())
        }
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> FeedError {
    FeedError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    #[instrument(skip(self), fields(destination = %destination.display()))]
    async fn download(&self, url: &str, destination: &Path) -> Result<u64, FeedError> {
        debug!("Fetching feed");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status.as_u16()));
        }

        let mut file = File::create(destination)
            .await
            .map_err(|e| io_error(destination, &e))?;

        let mut body = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.map_request_error(&e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| io_error(destination, &e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| io_error(destination, &e))?;

        debug!(bytes = written, "Feed written");
        Ok(written)
    }
}
