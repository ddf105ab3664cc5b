//! # Client Configuration
//!
//! Where the API lives, who the broker is and how strictly responses are
//! checked. Loaded from a file through serde or from the environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.digipost.no/";

/// Configuration of one [`DigipostClient`](crate::DigipostClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Entry point of the API. Every other URI is discovered from here.
    pub api_url: Url,
    /// Broker id, sent as `X-Digipost-UserId`.
    pub broker_id: u64,
    /// Pinned server certificate (PEM). Without it the certificate of the
    /// entry point is trusted on first use.
    pub server_certificate_pem: Option<String>,
    /// Oldest accepted response `Date`.
    #[serde(with = "humantime_serde")]
    pub max_response_age: Duration,
    /// Furthest accepted response `Date` in the future.
    #[serde(with = "humantime_serde")]
    pub max_future_skew: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            broker_id: 0,
            server_certificate_pem: None,
            max_response_age: digipost_security::DEFAULT_MAX_AGE,
            max_future_skew: digipost_security::DEFAULT_MAX_FUTURE_SKEW,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: format!("digipost-client-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: Url, broker_id: u64) -> Self {
        Self {
            api_url,
            broker_id,
            ..Self::default()
        }
    }

    /// Read `DIGIPOST_API_URL`, `DIGIPOST_BROKER_ID`,
    /// `DIGIPOST_SERVER_CERTIFICATE` (a PEM file path) and
    /// `DIGIPOST_USER_AGENT`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("DIGIPOST_API_URL") {
            config.api_url =
                Url::parse(&url).map_err(|e| ConfigError::InvalidUrl(format!("{url}: {e}")))?;
        }
        if let Ok(id) = env::var("DIGIPOST_BROKER_ID") {
            config.broker_id = id
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("DIGIPOST_BROKER_ID={id}")))?;
        }
        if let Ok(path) = env::var("DIGIPOST_SERVER_CERTIFICATE") {
            let pem = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::InvalidCertificate(format!("{path}: {e}")))?;
            config.server_certificate_pem = Some(pem);
        }
        config.user_agent = env::var("DIGIPOST_USER_AGENT").unwrap_or_else(|_| config.user_agent);

        Ok(config)
    }

    pub fn with_server_certificate(mut self, pem: impl Into<String>) -> Self {
        self.server_certificate_pem = Some(pem.into());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.api_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "unsupported scheme {}",
                self.api_url.scheme()
            )));
        }
        if self.api_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl(self.api_url.to_string()));
        }

        if self.broker_id == 0 {
            return Err(ConfigError::MissingBrokerId);
        }

        if self.max_response_age.is_zero() || self.max_future_skew.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "response date window must be positive".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() || self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "transport timeouts must be positive".to_string(),
            ));
        }
        if self.connect_timeout > self.request_timeout {
            return Err(ConfigError::InvalidTimeout(
                "connect timeout exceeds request timeout".to_string(),
            ));
        }

        if let Some(pem) = &self.server_certificate_pem {
            digipost_security::ServerCertificate::from_pem(pem)
                .map_err(|e| ConfigError::InvalidCertificate(e.to_string()))?;
        }

        Ok(())
    }
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!("constant URL parses"))
}

/// Configuration errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No broker id configured
    #[error("broker id is not configured")]
    MissingBrokerId,
    /// API URL is not an absolute http(s) URL
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    /// Invalid timeout or window value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Pinned certificate cannot be read or parsed
    #[error("invalid server certificate: {0}")]
    InvalidCertificate(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations as `"30s"`, `"500ms"`, `"5m"` or plain seconds.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| "invalid minutes")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}
