//! # Canonical Strings
//!
//! The deterministic text both client and server sign and verify. Both sides
//! must reproduce these strings byte for byte.
//!
//! ```text
//! request:  METHOD \n lowercase(path) \n {name: value \n}* query \n
//! response: STATUS \n lowercase(request path) \n {name: value \n}*
//! ```
//!
//! Header lines appear sorted by lowercase header name. The query line holds
//! the form-urlencoded pairs sorted by key, then value, and is empty when the
//! request has no query.

use super::errors::SecurityError;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

/// Header names used by the signing protocol.
pub mod headers {
    /// RFC 1123 timestamp of the exchange.
    pub const DATE: &str = "date";
    /// Base64 SHA-256 of the body.
    pub const CONTENT_SHA256: &str = "x-content-sha256";
    /// Caller-chosen nonce, echoed by the server.
    pub const NONCE: &str = "x-digipost-nonce";
    /// Broker id of the signing organisation.
    pub const USER_ID: &str = "x-digipost-userid";
    /// Base64 RSA/SHA-256 signature over the canonical string.
    pub const SIGNATURE: &str = "x-digipost-signature";
}

/// Headers covered by a request signature, in canonical order.
pub const SIGNED_REQUEST_HEADERS: [&str; 4] = [
    headers::DATE,
    headers::CONTENT_SHA256,
    headers::NONCE,
    headers::USER_ID,
];

/// Headers covered by a response signature, in canonical order.
pub const SIGNED_RESPONSE_HEADERS: [&str; 3] =
    [headers::DATE, headers::CONTENT_SHA256, headers::NONCE];

// =============================================================================
// REQUEST
// =============================================================================

/// Canonical representation of an outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalRequest(String);

impl CanonicalRequest {
    /// Build the canonical string from the request line and its signed headers.
    ///
    /// All of [`SIGNED_REQUEST_HEADERS`] must already be present.
    pub fn new(method: &Method, url: &Url, headers: &HeaderMap) -> Result<Self, SecurityError> {
        let mut canonical = String::new();
        canonical.push_str(method.as_str());
        canonical.push('\n');
        canonical.push_str(&url.path().to_lowercase());
        canonical.push('\n');
        for name in SIGNED_REQUEST_HEADERS {
            push_header_line(&mut canonical, headers, name)?;
        }
        canonical.push_str(&canonical_query(url));
        canonical.push('\n');
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Canonical representation of a response, bound to the request path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalResponse(String);

impl CanonicalResponse {
    /// Build the canonical string for a response to a request on `request_url`.
    pub fn new(
        status: StatusCode,
        request_url: &Url,
        headers: &HeaderMap,
    ) -> Result<Self, SecurityError> {
        let mut canonical = String::new();
        canonical.push_str(status.as_str());
        canonical.push('\n');
        canonical.push_str(&request_url.path().to_lowercase());
        canonical.push('\n');
        for name in SIGNED_RESPONSE_HEADERS {
            push_header_line(&mut canonical, headers, name)?;
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Read a header as UTF-8 text.
pub fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<&'a str, SecurityError> {
    let value = headers
        .get(name)
        .ok_or(SecurityError::MissingHeader(name))?;
    value
        .to_str()
        .map_err(|e| SecurityError::MalformedHeader {
            header: name,
            reason: e.to_string(),
        })
}

fn push_header_line(
    canonical: &mut String,
    headers: &HeaderMap,
    name: &'static str,
) -> Result<(), SecurityError> {
    let value = header_str(headers, name)?;
    canonical.push_str(name);
    canonical.push_str(": ");
    canonical.push_str(value.trim());
    canonical.push('\n');
    Ok(())
}

/// Sorted, form-urlencoded query string. Empty when the URL has no query.
pub fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        return String::new();
    }
    pairs.sort();
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
