//! # Domain Entities
//!
//! Values that live for the duration of one request/response exchange.

use super::canonical::CanonicalRequest;
use super::digest::ContentDigest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;
use uuid::Uuid;

/// Digest and cipher suite used for every signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 over SHA-256.
    RsaSha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RsaSha256 => "SHA256withRSA",
        }
    }
}

/// The signed canonical request and the header values it covers.
#[derive(Clone, Debug)]
pub struct SignatureEnvelope {
    /// The exact string that was signed.
    pub canonical: CanonicalRequest,
    pub algorithm: SignatureAlgorithm,
    pub signature: Vec<u8>,
    /// `Date` header value (RFC 1123).
    pub date: String,
    pub nonce: Uuid,
    pub content_sha256: ContentDigest,
}

impl SignatureEnvelope {
    /// Signature as carried in the `X-Digipost-Signature` header.
    pub fn signature_base64(&self) -> String {
        STANDARD.encode(&self.signature)
    }
}

/// What the verifier must know about the request a response answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub request_url: Url,
    pub nonce: Uuid,
}
