//! # Content Digests
//!
//! SHA-256 digests of request and response bodies, carried base64-encoded in
//! the `X-Content-SHA256` header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt;

/// Base64-encoded SHA-256 digest of a message body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Digest of a complete in-memory body.
    pub fn of(body: &[u8]) -> Self {
        let mut digester = ContentDigester::new();
        digester.update(body);
        digester.finish()
    }

    /// Digest of the empty body, sent with GET/DELETE requests.
    pub fn empty() -> Self {
        Self::of(&[])
    }

    /// Wrap a digest received in a header.
    pub fn from_header_value(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental digester for streamed content.
///
/// Uploads are hashed chunk by chunk so that documents never need to be held
/// in memory in full.
#[derive(Clone, Default)]
pub struct ContentDigester {
    hasher: Sha256,
    length: u64,
}

impl ContentDigester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.length += chunk.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn finish(self) -> ContentDigest {
        ContentDigest(STANDARD.encode(self.hasher.finalize()))
    }
}
