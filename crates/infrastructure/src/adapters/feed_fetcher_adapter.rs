//! Feed fetcher adapter - Implements FeedFetcherPort using integration_ical

use std::path::Path;

use application::{error::ApplicationError, ports::FeedFetcherPort};
use async_trait::async_trait;
use integration_ical::{FeedClient, FeedClientConfig, FeedError, HttpFeedClient};
use tracing::instrument;

/// Downloads the feed over HTTP
#[derive(Debug)]
pub struct FeedFetcherAdapter {
    client: HttpFeedClient,
}

impl FeedFetcherAdapter {
    /// Create an adapter with the given client configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: FeedClientConfig) -> Result<Self, ApplicationError> {
        let client = HttpFeedClient::new(config).map_err(Self::map_error)?;
        Ok(Self { client })
    }

    /// Map integration feed error to application error
    fn map_error(err: FeedError) -> ApplicationError {
        match err {
            FeedError::Io { .. } => ApplicationError::Io(err.to_string()),
            FeedError::ConnectionFailed(e) => ApplicationError::Internal(e),
            FeedError::RequestFailed(_) | FeedError::Timeout(_) | FeedError::HttpStatus(_) => {
                ApplicationError::ExternalService(err.to_string())
            },
        }
    }
}

#[async_trait]
impl FeedFetcherPort for FeedFetcherAdapter {
    #[instrument(skip(self, destination))]
    async fn fetch_and_store(&self, url: &str, destination: &Path) -> Result<u64, ApplicationError> {
        self.client
            .download(url, destination)
            .await
            .map_err(Self::map_error)
    }
}
