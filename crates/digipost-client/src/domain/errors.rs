//! # Client Errors
//!
//! Every failure surfaced by the client is a [`DigipostError`]. Errors of the
//! lower crates are folded in here so callers match on one enum.

use super::config::ConfigError;
use digipost_representations::{ErrorType, Relation, RepresentationError};
use digipost_security::SecurityError;
use http::StatusCode;
use std::fmt;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Coarse classification of a [`DigipostError`], kept by failed deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AuthenticationFailure,
    SchemaValidation,
    IllegalState,
    LinkAlreadyUsed,
    UnknownVariant,
    ServerRejection,
    Transport,
    DocumentNotFound,
    InvalidArgument,
    Configuration,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            Self::SchemaValidation => "SCHEMA_VALIDATION",
            Self::IllegalState => "ILLEGAL_STATE",
            Self::LinkAlreadyUsed => "LINK_ALREADY_USED",
            Self::UnknownVariant => "UNKNOWN_VARIANT",
            Self::ServerRejection => "SERVER_REJECTION",
            Self::Transport => "TRANSPORT",
            Self::DocumentNotFound => "DOCUMENT_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Configuration => "CONFIGURATION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures below the HTTP semantics: connecting, timing out, reading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(String),

    /// The body does not match its signed digest.
    #[error("Response body corrupted: {0}")]
    BodyCorrupted(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),
}

impl From<std::io::Error> for TransportError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<url::ParseError> for TransportError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUri(error.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigipostError {
    /// Signing failed or a response could not be authenticated.
    #[error("Authentication failure: {0}")]
    AuthenticationFailure(SecurityError),

    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// Operation not allowed in the current delivery state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Single-use link followed twice.
    #[error("Link {relation} already used: {uri}")]
    LinkAlreadyUsed { relation: Relation, uri: Url },

    #[error("Unknown {family} variant: {discriminator}")]
    UnknownVariant {
        family: &'static str,
        discriminator: String,
    },

    /// Authenticated non-2xx response.
    #[error("Server rejected request ({status}, {error_type}): {message}")]
    ServerRejection {
        status: StatusCode,
        error_type: ErrorType,
        code: Option<String>,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl DigipostError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AuthenticationFailure(_) => ErrorCode::AuthenticationFailure,
            Self::SchemaValidation(_) => ErrorCode::SchemaValidation,
            Self::IllegalState(_) => ErrorCode::IllegalState,
            Self::LinkAlreadyUsed { .. } => ErrorCode::LinkAlreadyUsed,
            Self::UnknownVariant { .. } => ErrorCode::UnknownVariant,
            Self::ServerRejection { .. } => ErrorCode::ServerRejection,
            Self::Transport(_) => ErrorCode::Transport,
            Self::DocumentNotFound(_) => ErrorCode::DocumentNotFound,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Configuration(_) => ErrorCode::Configuration,
        }
    }

    pub(crate) fn illegal_state(reason: impl Into<String>) -> Self {
        Self::IllegalState(reason.into())
    }
}

impl From<SecurityError> for DigipostError {
    fn from(error: SecurityError) -> Self {
        match error {
            SecurityError::ContentDigestMismatch { header, computed } => {
                Self::Transport(TransportError::BodyCorrupted(format!(
                    "header {header}, computed {computed}"
                )))
            }
            other => Self::AuthenticationFailure(other),
        }
    }
}

impl From<RepresentationError> for DigipostError {
    fn from(error: RepresentationError) -> Self {
        match error {
            RepresentationError::UnknownVariant {
                family,
                discriminator,
            } => Self::UnknownVariant {
                family,
                discriminator,
            },
            RepresentationError::DocumentNotFound(uuid) => Self::DocumentNotFound(uuid),
            RepresentationError::Xml(_) | RepresentationError::SchemaValidation { .. } => {
                Self::SchemaValidation(error.to_string())
            }
            RepresentationError::DuplicateDocumentUuid(_)
            | RepresentationError::MissingRecipient
            | RepresentationError::InvalidValue { .. } => Self::InvalidArgument(error.to_string()),
        }
    }
}

impl From<std::io::Error> for DigipostError {
    fn from(error: std::io::Error) -> Self {
        Self::Transport(error.into())
    }
}
