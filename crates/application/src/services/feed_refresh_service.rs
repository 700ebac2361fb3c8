//! Feed refresh service
//!
//! Keeps the in-memory roster snapshot in step with the cache file, and the
//! cache file in step with the upstream feed. Staleness is judged solely by
//! the cache file's modification time.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwap;
use chrono::Utc;
use domain::Roster;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{CalendarParserPort, FeedCachePort, FeedFetcherPort},
    services::{DataStatus, RefreshStatus},
};

/// Default cache time-to-live (two hours)
pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Settings for the refresh service
#[derive(Debug, Clone)]
pub struct FeedRefreshConfig {
    /// URL of the iCalendar feed
    pub feed_url: String,
    /// Age after which the cache file is refetched
    pub ttl: Duration,
}

impl FeedRefreshConfig {
    /// Create a config with the default TTL
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            ttl: DEFAULT_FEED_TTL,
        }
    }

    /// Override the TTL
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Result of a freshness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessOutcome {
    /// Cache and snapshot were current, nothing was done
    Fresh,
    /// A new snapshot was swapped in
    Refreshed { events: usize },
    /// The refresh failed; the previous snapshot is still served
    Failed { error: String },
}

/// Owns the roster snapshot and refreshes it on demand
pub struct FeedRefreshService {
    config: FeedRefreshConfig,
    fetcher: Arc<dyn FeedFetcherPort>,
    cache: Arc<dyn FeedCachePort>,
    parser: Arc<dyn CalendarParserPort>,
    snapshot: ArcSwap<Roster>,
    status: RwLock<RefreshStatus>,
    /// Serializes fetch + parse so concurrent stale checks fetch once
    refresh_lock: Mutex<()>,
    /// Bumped whenever a fetch or reload finishes, successful or not
    generation: AtomicU64,
}

impl fmt::Debug for FeedRefreshService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedRefreshService")
            .field("config", &self.config)
            .field("events", &self.snapshot.load().len())
            .finish_non_exhaustive()
    }
}

impl FeedRefreshService {
    /// Create a service with an empty snapshot
    pub fn new(
        config: FeedRefreshConfig,
        fetcher: Arc<dyn FeedFetcherPort>,
        cache: Arc<dyn FeedCachePort>,
        parser: Arc<dyn CalendarParserPort>,
    ) -> Self {
        Self {
            config,
            fetcher,
            cache,
            parser,
            snapshot: ArcSwap::from_pointee(Roster::default()),
            status: RwLock::new(RefreshStatus::default()),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current roster snapshot
    pub fn snapshot(&self) -> Arc<Roster> {
        self.snapshot.load_full()
    }

    /// Copy of the refresh bookkeeping
    pub fn status(&self) -> RefreshStatus {
        self.status.read().clone()
    }

    /// Trustworthiness of the current snapshot
    pub fn data_status(&self) -> DataStatus {
        self.status.read().data_status()
    }

    /// Startup: serve whatever is cached, then fetch the feed once
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> FreshnessOutcome {
        let _guard = self.refresh_lock.lock().await;

        if let FreshnessOutcome::Refreshed { events } = self.reload_locked().await {
            info!(events, "Loaded roster from existing cache file");
        }

        self.refresh_locked().await
    }

    /// Refetch and reparse if the cache file is older than the TTL
    ///
    /// Failures are logged and recorded; the previous snapshot stays in place.
    /// Callers that queue behind an in-flight attempt share its outcome,
    /// whether it succeeded or failed, instead of fetching again.
    #[instrument(skip(self))]
    pub async fn ensure_fresh(&self) -> FreshnessOutcome {
        let seen = self.generation.load(Ordering::Acquire);
        if !self.needs_work().await {
            return FreshnessOutcome::Fresh;
        }

        let _guard = self.refresh_lock.lock().await;

        if self.generation.load(Ordering::Acquire) != seen {
            debug!("Joined a concurrent refresh");
            return match self.status.read().last_error.clone() {
                Some(error) => FreshnessOutcome::Failed { error },
                None => FreshnessOutcome::Fresh,
            };
        }

        if self.is_stale().await {
            self.refresh_locked().await
        } else if !self.is_loaded() {
            self.reload_locked().await
        } else {
            debug!("Refreshed by a concurrent request");
            FreshnessOutcome::Fresh
        }
    }

    async fn needs_work(&self) -> bool {
        !self.is_loaded() || self.is_stale().await
    }

    fn is_loaded(&self) -> bool {
        self.status.read().loaded
    }

    async fn is_stale(&self) -> bool {
        match self.cache.last_modified().await {
            Ok(Some(modified)) => match (Utc::now() - modified).to_std() {
                Ok(age) => age > self.config.ttl,
                // modification time in the future
                Err(_) => false,
            },
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Failed to stat cache file, treating it as stale");
                true
            },
        }
    }

    async fn refresh_locked(&self) -> FreshnessOutcome {
        self.status.write().record_attempt(Utc::now());
        let destination = self.cache.location();

        match self
            .fetcher
            .fetch_and_store(&self.config.feed_url, &destination)
            .await
        {
            Ok(bytes) => {
                info!(bytes, path = %destination.display(), "Feed downloaded");
                self.reload_locked().await
            },
            Err(e) => self.fail(&e),
        }
    }

    async fn reload_locked(&self) -> FreshnessOutcome {
        self.status.write().record_attempt(Utc::now());

        match self.load_roster().await {
            Ok(roster) => {
                let events = roster.len();
                self.snapshot.store(Arc::new(roster));
                self.status.write().record_success(Utc::now(), events);
                self.generation.fetch_add(1, Ordering::Release);
                info!(events, "Roster snapshot replaced");
                FreshnessOutcome::Refreshed { events }
            },
            Err(e) => self.fail(&e),
        }
    }

    async fn load_roster(&self) -> Result<Roster, ApplicationError> {
        let ics = self.cache.read().await?.ok_or_else(|| {
            ApplicationError::Io(format!(
                "cache file {} does not exist",
                self.cache.location().display()
            ))
        })?;

        let parser = Arc::clone(&self.parser);
        let events = tokio::task::spawn_blocking(move || parser.parse(&ics))
            .await
            .map_err(|e| ApplicationError::Internal(format!("parser task failed: {e}")))??;

        Ok(Roster::new(events))
    }

    fn fail(&self, error: &ApplicationError) -> FreshnessOutcome {
        warn!(error = %error, "Feed refresh failed, keeping previous roster");
        self.status.write().record_failure(error.to_string());
        self.generation.fetch_add(1, Ordering::Release);
        FreshnessOutcome::Failed {
            error: error.to_string(),
        }
    }
}
