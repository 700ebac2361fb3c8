//! File cache adapter - Implements FeedCachePort over a single local file

use std::{io::ErrorKind, path::PathBuf};

use application::{error::ApplicationError, ports::FeedCachePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// The cache file holding the last downloaded feed verbatim
#[derive(Debug, Clone)]
pub struct FileCacheAdapter {
    path: PathBuf,
}

impl FileCacheAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedCachePort for FileCacheAdapter {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, ApplicationError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(Some(DateTime::<Utc>::from(meta.modified()?))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn read(&self) -> Result<Option<String>, ApplicationError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), "Read cache file");
                // invalid UTF-8 sequences become U+FFFD
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
