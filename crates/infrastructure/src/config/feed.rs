//! Feed, roster and logging configuration.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use domain::{DEFAULT_MAX_ATTENDEES, DomainError, TimezoneResolver};
use integration_ical::{FeedClientConfig, IcsParser, RecurrenceWindow};
use serde::{Deserialize, Serialize};

/// Where the feed comes from and how it is cached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// iCalendar feed URL (required)
    #[serde(default)]
    pub url: String,

    /// Cache file path (default: rooster.ics)
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Cache time-to-live in seconds (default: 7200)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Outbound request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra TZID remappings (feed name -> IANA id)
    #[serde(default)]
    pub timezone_aliases: HashMap<String, String>,

    /// Zone for floating timestamps and all-day dates (default: UTC)
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Days before now for which recurring sessions are kept (default: 1)
    #[serde(default = "default_recurrence_past_days")]
    pub recurrence_past_days: u32,

    /// Days after now up to which recurring sessions are generated (default: 90)
    #[serde(default = "default_recurrence_future_days")]
    pub recurrence_future_days: u32,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("rooster.ics")
}

const fn default_ttl_secs() -> u64 {
    2 * 60 * 60
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("rooster/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

const fn default_recurrence_past_days() -> u32 {
    1
}

const fn default_recurrence_future_days() -> u32 {
    90
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            cache_path: default_cache_path(),
            ttl_secs: default_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            timezone_aliases: HashMap::new(),
            default_timezone: default_timezone(),
            recurrence_past_days: default_recurrence_past_days(),
            recurrence_future_days: default_recurrence_future_days(),
        }
    }
}

impl FeedConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Settings for the HTTP feed client
    pub fn client_config(&self) -> FeedClientConfig {
        FeedClientConfig {
            timeout_secs: self.timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }

    /// Built-in aliases plus the configured ones, with the default zone applied
    ///
    /// # Errors
    ///
    /// Returns an error if an alias target or the default zone is not an
    /// IANA timezone.
    pub fn timezone_resolver(&self) -> Result<TimezoneResolver, DomainError> {
        let mut resolver = TimezoneResolver::new().with_default_zone(&self.default_timezone)?;
        for (alias, iana) in &self.timezone_aliases {
            resolver = resolver.with_alias(alias.clone(), iana)?;
        }
        Ok(resolver)
    }

    /// Span around the parse time in which RRULEs are expanded
    pub fn recurrence_window(&self) -> RecurrenceWindow {
        RecurrenceWindow::new(
            chrono::Duration::days(i64::from(self.recurrence_past_days)),
            chrono::Duration::days(i64::from(self.recurrence_future_days)),
        )
    }

    /// Feed parser with the configured zones and recurrence window
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone settings are invalid.
    pub fn ics_parser(&self) -> Result<IcsParser, DomainError> {
        Ok(IcsParser::with_resolver(self.timezone_resolver()?)
            .with_recurrence_window(self.recurrence_window()))
    }
}

/// Roster query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Teacher/class lists longer than this are emptied (default: 20)
    #[serde(default = "default_max_attendees")]
    pub max_attendees: usize,
}

const fn default_max_attendees() -> usize {
    DEFAULT_MAX_ATTENDEES
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            max_attendees: default_max_attendees(),
        }
    }
}

/// Log filter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level filter, overridden by RUST_LOG
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "rooster_server=info,presentation_http=info,application=info,infrastructure=info,integration_ical=info,tower_http=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
