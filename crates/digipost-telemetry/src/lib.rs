//! # Digipost Telemetry
//!
//! `tracing-subscriber` setup for programs built on the Digipost client.
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to the binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use digipost_telemetry::{init_logging, TelemetryConfig};
//!
//! init_logging(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DIGIPOST_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directive |
//! | `DIGIPOST_LOG_JSON` | `false` (`true` in containers) | JSON lines |
//! | `DIGIPOST_LOG_LOCATION` | `false` | Source file and line |
//! | `DIGIPOST_SERVICE_NAME` | `digipost-client` | Service name |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
