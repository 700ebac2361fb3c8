//! Refresh bookkeeping exposed to health endpoints and response headers

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How trustworthy the currently served roster is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStatus {
    /// The last refresh attempt succeeded
    Fresh,
    /// The last refresh attempt failed; an older snapshot is being served
    Stale,
    /// No snapshot has ever been loaded
    Unavailable,
}

impl DataStatus {
    /// Lowercase name, as used in headers
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Unavailable => "unavailable",
        }
    }

    /// Whether any data can be served
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for DataStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome history of feed refreshes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStatus {
    /// When a refresh (fetch or cache reload) was last attempted
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// When a snapshot was last swapped in successfully
    pub last_success_at: Option<DateTime<Utc>>,
    /// Error of the last attempt, cleared by the next success
    pub last_error: Option<String>,
    /// Events in the current snapshot
    pub event_count: usize,
    /// Whether any snapshot has been loaded since startup
    pub loaded: bool,
}

impl RefreshStatus {
    /// Derive the data status
    pub const fn data_status(&self) -> DataStatus {
        if !self.loaded {
            DataStatus::Unavailable
        } else if self.last_error.is_some() {
            DataStatus::Stale
        } else {
            DataStatus::Fresh
        }
    }

    pub(crate) fn record_attempt(&mut self, at: DateTime<Utc>) {
        self.last_attempt_at = Some(at);
    }

    pub(crate) fn record_success(&mut self, at: DateTime<Utc>, event_count: usize) {
        self.last_success_at = Some(at);
        self.last_error = None;
        self.event_count = event_count;
        self.loaded = true;
    }

    pub(crate) fn record_failure(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }
}
