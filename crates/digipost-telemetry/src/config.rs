//! Logging configuration from environment variables.

use std::env;

pub const DEFAULT_SERVICE_NAME: &str = "digipost-client";

/// How log output is filtered and formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Recorded on every JSON line as `service`
    pub service_name: String,

    /// `EnvFilter` directive, e.g. `info` or `digipost_client=debug,warn`
    pub log_level: String,

    /// One JSON object per line instead of human-readable text
    pub json_logs: bool,

    /// Include source file and line
    pub with_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            with_location: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DIGIPOST_SERVICE_NAME`: Service name (default: digipost-client)
    /// - `DIGIPOST_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `DIGIPOST_LOG_JSON`: JSON output (default: false, true in containers)
    /// - `DIGIPOST_LOG_LOCATION`: Source locations (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TelemetryConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_container = lookup("KUBERNETES_SERVICE_HOST").is_some()
            || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("DIGIPOST_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),

            log_level: lookup("DIGIPOST_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            json_logs: lookup("DIGIPOST_LOG_JSON")
                .map(|v| flag(&v))
                .unwrap_or(is_container),

            with_location: lookup("DIGIPOST_LOG_LOCATION")
                .map(|v| flag(&v))
                .unwrap_or(false),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
