//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer on top of the
//! iCalendar integration and the local filesystem, and owns configuration
//! loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ConfigError, FeedConfig, LogConfig, RosterConfig, ServerConfig};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
