//! Logging setup
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (RUST_LOG wins
//! over the configured filter) and a text or JSON formatter.

mod logging;

pub use logging::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
