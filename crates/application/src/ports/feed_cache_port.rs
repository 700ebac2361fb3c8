//! Feed cache port
//!
//! Access to the single local file holding the last fetched feed.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for the on-disk feed cache
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FeedCachePort: Send + Sync {
    /// Path of the cache file
    fn location(&self) -> PathBuf;

    /// Last-modified time of the cache file, `None` if it does not exist
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, ApplicationError>;

    /// Contents of the cache file, `None` if it does not exist
    async fn read(&self) -> Result<Option<String>, ApplicationError>;
}
