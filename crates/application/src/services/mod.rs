//! Application services - Use case implementations

mod feed_refresh_service;
mod refresh_status;
mod roster_service;

pub use feed_refresh_service::{
    DEFAULT_FEED_TTL, FeedRefreshConfig, FeedRefreshService, FreshnessOutcome,
};
pub use refresh_status::{DataStatus, RefreshStatus};
pub use roster_service::{RosterQuery, RosterService};
