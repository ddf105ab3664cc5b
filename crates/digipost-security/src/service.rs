//! # Request Authenticator & Response Verifier
//!
//! Application services of the signing protocol:
//! - [`RequestAuthenticator`] stamps every outgoing request with date, body
//!   digest, nonce, user id and the signature over the canonical string.
//! - [`ResponseVerifier`] rejects any response that is not signed by the
//!   server, answers another request, or is stale.

use crate::adapters::certificate::ServerCertificate;
use crate::domain::canonical::{header_str, headers, CanonicalRequest, CanonicalResponse};
use crate::domain::digest::ContentDigest;
use crate::domain::entities::{Exchange, SignatureAlgorithm, SignatureEnvelope};
use crate::domain::errors::SecurityError;
use crate::ports::outbound::Signer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use http::header::HeaderValue;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// RFC 1123 date as used in the `Date` header.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Maximum accepted age of a response `Date` (seconds).
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(300);

/// Maximum accepted clock skew for a response `Date` in the future (seconds).
pub const DEFAULT_MAX_FUTURE_SKEW: Duration = Duration::from_secs(300);

pub fn format_http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

// =============================================================================
// REQUEST AUTHENTICATOR
// =============================================================================

/// Signs outgoing requests on behalf of one broker.
#[derive(Clone)]
pub struct RequestAuthenticator {
    user_id: u64,
    signer: Arc<dyn Signer>,
}

impl RequestAuthenticator {
    pub fn new(user_id: u64, signer: Arc<dyn Signer>) -> Self {
        Self { user_id, signer }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Add the signed headers and the signature to `request_headers`.
    ///
    /// `content_sha256` must be the digest of exactly the bytes that will be
    /// sent as the body.
    pub fn authenticate(
        &self,
        method: &Method,
        url: &Url,
        request_headers: &mut HeaderMap,
        content_sha256: &ContentDigest,
        now: DateTime<Utc>,
        nonce: Uuid,
    ) -> Result<SignatureEnvelope, SecurityError> {
        let date = format_http_date(now);
        insert_header(request_headers, headers::DATE, &date)?;
        insert_header(request_headers, headers::CONTENT_SHA256, content_sha256.as_str())?;
        insert_header(request_headers, headers::NONCE, &nonce.to_string())?;
        insert_header(request_headers, headers::USER_ID, &self.user_id.to_string())?;

        let canonical = CanonicalRequest::new(method, url, request_headers)?;
        let signature = self.signer.sign(canonical.as_str())?;
        let envelope = SignatureEnvelope {
            canonical,
            algorithm: SignatureAlgorithm::RsaSha256,
            signature,
            date,
            nonce,
            content_sha256: content_sha256.clone(),
        };
        insert_header(request_headers, headers::SIGNATURE, &envelope.signature_base64())?;

        tracing::trace!(
            %nonce,
            algorithm = envelope.algorithm.as_str(),
            "Signed request {} {}",
            method,
            url.path()
        );
        Ok(envelope)
    }
}

impl fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

fn insert_header(
    map: &mut HeaderMap,
    name: &'static str,
    value: &str,
) -> Result<(), SecurityError> {
    let value = HeaderValue::from_str(value).map_err(|e| SecurityError::MalformedHeader {
        header: name,
        reason: e.to_string(),
    })?;
    map.insert(name, value);
    Ok(())
}

// =============================================================================
// RESPONSE VERIFIER
// =============================================================================

/// Verifies response signatures against the server certificate.
#[derive(Clone, Debug)]
pub struct ResponseVerifier {
    certificate: ServerCertificate,
    max_age: chrono::Duration,
    max_future_skew: chrono::Duration,
}

impl ResponseVerifier {
    pub fn new(certificate: ServerCertificate) -> Self {
        Self {
            certificate,
            max_age: to_time_delta(DEFAULT_MAX_AGE),
            max_future_skew: to_time_delta(DEFAULT_MAX_FUTURE_SKEW),
        }
    }

    /// Override the accepted `Date` window.
    pub fn with_window(mut self, max_age: Duration, max_future_skew: Duration) -> Self {
        self.max_age = to_time_delta(max_age);
        self.max_future_skew = to_time_delta(max_future_skew);
        self
    }

    pub fn certificate(&self) -> &ServerCertificate {
        &self.certificate
    }

    /// Check a response before its body is used.
    ///
    /// Applies to every response regardless of status code. Order of checks:
    /// signature header, echoed nonce, date window, signature, body digest.
    /// Only the last one yields [`SecurityError::ContentDigestMismatch`]; every
    /// other failure is an authentication failure.
    pub fn verify(
        &self,
        exchange: &Exchange,
        status: StatusCode,
        response_headers: &HeaderMap,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), SecurityError> {
        let signature = STANDARD
            .decode(header_str(response_headers, headers::SIGNATURE)?.trim())
            .map_err(|e| SecurityError::MalformedHeader {
                header: headers::SIGNATURE,
                reason: e.to_string(),
            })?;

        let echoed_nonce = header_str(response_headers, headers::NONCE)?.trim();
        let expected_nonce = exchange.nonce.to_string();
        if echoed_nonce != expected_nonce {
            return Err(SecurityError::ReplayDetected {
                expected: expected_nonce,
                actual: echoed_nonce.to_string(),
            });
        }

        self.check_date(header_str(response_headers, headers::DATE)?, now)?;

        let canonical = CanonicalResponse::new(status, &exchange.request_url, response_headers)?;
        if !self.certificate.verify(canonical.as_str(), &signature) {
            return Err(SecurityError::SignatureMismatch);
        }

        let declared = header_str(response_headers, headers::CONTENT_SHA256)?.trim();
        let computed = ContentDigest::of(body);
        if declared != computed.as_str() {
            return Err(SecurityError::ContentDigestMismatch {
                header: declared.to_string(),
                computed: computed.to_string(),
            });
        }
        Ok(())
    }

    fn check_date(&self, value: &str, now: DateTime<Utc>) -> Result<(), SecurityError> {
        let date = DateTime::parse_from_rfc2822(value.trim())
            .map_err(|e| SecurityError::MalformedHeader {
                header: headers::DATE,
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);
        if date < now - self.max_age || date > now + self.max_future_skew {
            return Err(SecurityError::TimestampOutOfRange {
                date: date.to_rfc3339(),
                now: now.to_rfc3339(),
            });
        }
        Ok(())
    }
}

fn to_time_delta(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::days(365))
}

// =============================================================================
// TESTS
// =============================================================================
