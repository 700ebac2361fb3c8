//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `feed`: feed source, cache, roster cap and log filter
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, `ROOSTER_*` environment variables (`__` separates nested
//! keys, e.g. `ROOSTER_FEED__TTL_SECS`), and finally `FEED_URL`. A `.env`
//! file in the working directory is loaded into the environment first.

mod feed;
mod server;

use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use feed::{FeedConfig, LogConfig, RosterConfig};
pub use server::ServerConfig;

use crate::telemetry::TelemetryConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Environment variable holding the feed URL
pub const FEED_URL_VAR: &str = "FEED_URL";

/// Prefix for all other environment overrides
pub const ENV_PREFIX: &str = "ROOSTER";

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// No feed URL in any source
    #[error("FEED_URL is not set")]
    MissingFeedUrl,

    /// A value is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A `.env` file exists but could not be read or parsed
    #[error("Failed to load .env file: {0}")]
    EnvFile(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Feed source and cache configuration
    #[serde(default)]
    pub feed: FeedConfig,

    /// Roster query configuration
    #[serde(default)]
    pub roster: RosterConfig,

    /// Log filter configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, `config.toml` and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        check_env_file(dotenvy::dotenv())?;
        Self::from_sources(Some("config"), None)
    }

    /// Load configuration from an optional file and an environment map
    ///
    /// `file` is a path without extension, as accepted by
    /// [`config::File::with_name`]. When `env` is `None` the process
    /// environment is used.
    pub fn from_sources(
        file: Option<&str>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let feed_url = match &env {
            Some(vars) => vars.get(FEED_URL_VAR).cloned(),
            None => std::env::var(FEED_URL_VAR).ok(),
        }
        .filter(|url| !url.trim().is_empty());

        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?;

        // Load from file if exists
        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            // Override with environment variables (e.g., ROOSTER_SERVER__PORT)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("feed.url", feed_url)?
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Check values that deserialization alone cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::MissingFeedUrl);
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "feed.timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.feed
            .timezone_resolver()
            .map_err(|e| ConfigError::Invalid(format!("feed timezone settings: {e}")))?;
        Ok(())
    }

    /// Logging settings derived from `server.log_format` and `log.filter`
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            log_filter: self.log.filter.clone(),
            log_format: self.server.log_format,
        }
    }
}

/// Accept a loaded or absent `.env`; reject one that is present but broken
fn check_env_file(loaded: Result<PathBuf, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use super::*;
    use crate::telemetry::LogFormat;

    fn env(vars: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn defaults_with_feed_url_only() {
        let config =
            AppConfig::from_sources(None, env(&[("FEED_URL", "https://example.com/r.ics")]))
                .unwrap();

        assert_eq!(config.feed.url, "https://example.com/r.ics");
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.feed.ttl(), Duration::from_secs(7200));
        assert_eq!(config.roster.max_attendees, 20);
        assert_eq!(config.server.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_feed_url_is_fatal() {
        let err = AppConfig::from_sources(None, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFeedUrl));
    }

    #[test]
    fn blank_feed_url_is_fatal() {
        let err = AppConfig::from_sources(None, env(&[("FEED_URL", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFeedUrl));
    }

    #[test]
    fn prefixed_env_overrides_nested_keys() {
        let config = AppConfig::from_sources(
            None,
            env(&[
                ("ROOSTER_FEED__URL", "https://example.com/a.ics"),
                ("ROOSTER_FEED__TTL_SECS", "60"),
                ("ROOSTER_SERVER__PORT", "9000"),
                ("ROOSTER_ROSTER__MAX_ATTENDEES", "5"),
                ("ROOSTER_SERVER__LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.feed.url, "https://example.com/a.ics");
        assert_eq!(config.feed.ttl_secs, 60);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.roster.max_attendees, 5);
        assert_eq!(config.server.log_format, LogFormat::Json);
    }

    #[test]
    fn feed_url_var_wins_over_prefixed_env() {
        let config = AppConfig::from_sources(
            None,
            env(&[
                ("ROOSTER_FEED__URL", "https://example.com/a.ics"),
                ("FEED_URL", "https://example.com/b.ics"),
            ]),
        )
        .unwrap();

        assert_eq!(config.feed.url, "https://example.com/b.ics");
    }

    #[test]
    fn file_values_are_layered_under_env() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r#"
[server]
port = 7000
host = "127.0.0.1"

[feed]
url = "https://example.com/file.ics"
cache_path = "/var/cache/rooster.ics"
default_timezone = "Europe/Amsterdam"

[feed.timezone_aliases]
"Romance Standard Time" = "Europe/Paris"
"#,
        )
        .unwrap();
        let base = dir.path().join("config");

        let config = AppConfig::from_sources(
            base.to_str(),
            env(&[("ROOSTER_SERVER__PORT", "7100")]),
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7100);
        assert_eq!(config.feed.url, "https://example.com/file.ics");
        assert_eq!(
            config.feed.cache_path,
            std::path::PathBuf::from("/var/cache/rooster.ics")
        );
        let resolver = config.feed.timezone_resolver().unwrap();
        assert_eq!(
            resolver.resolve("Romance Standard Time").unwrap(),
            chrono_tz::Europe::Paris
        );
        assert_eq!(resolver.default_zone(), chrono_tz::Europe::Amsterdam);
    }

    #[test]
    fn absent_env_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(check_env_file(result.map(|()| dir.path().join(".env"))).is_ok());
    }

    #[test]
    fn malformed_env_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "ROOSTER_BROKEN=\"unterminated\n").unwrap();

        let result = dotenvy::from_path(&path).map(|()| path.clone());
        let err = check_env_file(result).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }

    #[test]
    fn shutdown_timeout_defaults_when_loaded() {
        let config =
            AppConfig::from_sources(None, env(&[("FEED_URL", "https://example.com/r.ics")]))
                .unwrap();
        assert_eq!(config.server.shutdown_timeout_secs, Some(30));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = AppConfig::from_sources(
            Some("/nonexistent/rooster/config"),
            env(&[("FEED_URL", "https://example.com/r.ics")]),
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn unknown_default_timezone_is_invalid() {
        let err = AppConfig::from_sources(
            None,
            env(&[
                ("FEED_URL", "https://example.com/r.ics"),
                ("ROOSTER_FEED__DEFAULT_TIMEZONE", "Mars/Olympus"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = AppConfig::default();
        config.feed.url = "https://example.com/r.ics".to_string();
        config.feed.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn telemetry_settings_follow_config() {
        let mut config = AppConfig::default();
        config.server.log_format = LogFormat::Json;
        config.log.filter = "debug".to_string();

        let telemetry = config.telemetry();
        assert_eq!(telemetry.log_format, LogFormat::Json);
        assert_eq!(telemetry.log_filter, "debug");
    }

    #[test]
    fn app_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"port\":8080"));
        assert!(json.contains("\"ttl_secs\":7200"));
    }
}
