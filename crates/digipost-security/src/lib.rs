//! # Digipost Security
//!
//! Request signing and response verification for the Digipost API.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): canonical strings, body digests, errors
//! - **Ports Layer** (`ports/`): the [`Signer`] trait
//! - **Adapters** (`adapters/`): RSA private key and server certificate
//! - **Service Layer** (`service.rs`): [`RequestAuthenticator`] and [`ResponseVerifier`]
//!
//! ## Security Notes
//!
//! - Every request carries a fresh nonce; a response must echo it
//! - Responses are verified before their body is released, on every status code
//! - Body digest mismatch is reported separately from signature failure

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::certificate::ServerCertificate;
pub use adapters::rsa_signer::RsaSha256Signer;
pub use domain::canonical::{headers, CanonicalRequest, CanonicalResponse};
pub use domain::digest::{ContentDigest, ContentDigester};
pub use domain::entities::{Exchange, SignatureAlgorithm, SignatureEnvelope};
pub use domain::errors::SecurityError;
pub use domain::provider::ensure_algorithms_available;
pub use ports::outbound::Signer;
pub use service::{
    format_http_date, RequestAuthenticator, ResponseVerifier, DEFAULT_MAX_AGE,
    DEFAULT_MAX_FUTURE_SKEW, HTTP_DATE_FORMAT,
};
