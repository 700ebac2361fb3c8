//! Feed fetcher port
//!
//! Downloads the calendar feed into the local cache file.

use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for downloading the calendar feed
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedFetcherPort: Send + Sync {
    /// GET `url` and write the body verbatim to `destination`
    ///
    /// The destination is created or truncated only once the request has
    /// succeeded. Returns the number of bytes written.
    async fn fetch_and_store(&self, url: &str, destination: &Path)
    -> Result<u64, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn FeedFetcherPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn FeedFetcherPort>();
    }
}
