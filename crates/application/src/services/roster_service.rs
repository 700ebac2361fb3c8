//! Roster query service
//!
//! Answers the two read queries of the HTTP surface. Every query first asks
//! the refresh service to make sure the cache is within its TTL, then reads
//! one snapshot so a response never mixes two versions of the feed.

use std::sync::Arc;

use domain::{ClassCode, DEFAULT_MAX_ATTENDEES, RosterItem};
use tracing::{debug, instrument};

use crate::services::{DataStatus, FeedRefreshService, RefreshStatus};

/// Query result tagged with the status of the data it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterQuery<T> {
    pub data: T,
    pub status: DataStatus,
}

/// Read side of the roster
#[derive(Debug, Clone)]
pub struct RosterService {
    refresher: Arc<FeedRefreshService>,
    max_attendees: usize,
}

impl RosterService {
    /// Create a service with the default attendee cap
    pub const fn new(refresher: Arc<FeedRefreshService>) -> Self {
        Self {
            refresher,
            max_attendees: DEFAULT_MAX_ATTENDEES,
        }
    }

    /// Override the attendee cap applied to roster items
    #[must_use]
    pub const fn with_max_attendees(mut self, max_attendees: usize) -> Self {
        self.max_attendees = max_attendees;
        self
    }

    pub const fn max_attendees(&self) -> usize {
        self.max_attendees
    }

    /// Refresh bookkeeping, without triggering a refresh
    pub fn refresh_status(&self) -> RefreshStatus {
        self.refresher.status()
    }

    /// Distinct class codes in first-seen order
    #[instrument(skip(self))]
    pub async fn list_class_codes(&self) -> RosterQuery<Vec<ClassCode>> {
        self.refresher.ensure_fresh().await;

        let roster = self.refresher.snapshot();
        let data = roster.class_codes();
        debug!(count = data.len(), "Listed class codes");

        RosterQuery {
            data,
            status: self.refresher.data_status(),
        }
    }

    /// Roster items whose capped class list contains `code`
    #[instrument(skip(self), fields(class = %code))]
    pub async fn roster_for(&self, code: &ClassCode) -> RosterQuery<Vec<RosterItem>> {
        self.refresher.ensure_fresh().await;

        let roster = self.refresher.snapshot();
        let data = roster.items_for(code, self.max_attendees);
        debug!(count = data.len(), "Built roster");

        RosterQuery {
            data,
            status: self.refresher.data_status(),
        }
    }
}
