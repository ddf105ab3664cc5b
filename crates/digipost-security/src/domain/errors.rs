//! # Security Errors
//!
//! Error types for signing, key loading and response verification.

use thiserror::Error;

/// Errors raised while signing requests or verifying responses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecurityError {
    /// The private key could not be read or decoded.
    #[error("Failed to load private key: {0}")]
    KeyLoad(String),

    /// The key data is neither a PEM private key nor a PKCS#12 container.
    #[error("Unsupported key container: {0}")]
    UnsupportedKeyContainer(String),

    /// Producing a signature failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// A header that must be signed or verified is absent.
    #[error("Missing header: {0}")]
    MissingHeader(&'static str),

    /// A header is present but cannot be decoded.
    #[error("Malformed header {header}: {reason}")]
    MalformedHeader {
        header: &'static str,
        reason: String,
    },

    /// The response signature does not verify against the server certificate.
    #[error("Response signature does not match server certificate")]
    SignatureMismatch,

    /// The response does not echo the nonce of the request it answers.
    #[error("Replay detected: expected nonce {expected}, got {actual}")]
    ReplayDetected { expected: String, actual: String },

    /// The response date lies outside the accepted window.
    #[error("Response date {date} outside accepted window (now {now})")]
    TimestampOutOfRange { date: String, now: String },

    /// The body does not hash to the `X-Content-SHA256` value. Signals
    /// corruption in transit rather than a signature failure.
    #[error("Content digest mismatch: header {header}, computed {computed}")]
    ContentDigestMismatch { header: String, computed: String },

    /// The server certificate could not be parsed.
    #[error("Invalid server certificate: {0}")]
    CertificateParse(String),

    /// The provider self-test failed at initialisation.
    #[error("Cryptographic algorithms unavailable: {0}")]
    AlgorithmUnavailable(String),
}
