//! Outbound ports (driven side): HTTP transport, the delivery backend and time.

use crate::domain::errors::{DigipostError, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use digipost_representations::{Link, Message, MessageDelivery};
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use tokio::io::{AsyncRead, AsyncSeek};
use url::Url;

// =============================================================================
// CONTENT SOURCES
// =============================================================================

/// Document content to upload. Read once for the digest, rewound, then
/// streamed.
pub trait ContentSource: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ContentSource for T {}

pub type BoxedContent = Box<dyn ContentSource>;

// =============================================================================
// TRANSPORT
// =============================================================================

pub enum RequestBody {
    Empty,
    Bytes(Bytes),
    /// Streamed body of known length.
    Stream { reader: BoxedContent, length: u64 },
}

impl RequestBody {
    pub fn length(&self) -> u64 {
        match self {
            Self::Empty => 0,
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Stream { length, .. } => *length,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish(),
        }
    }
}

#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Response with its body read in full. Verification needs the whole body
/// before anything is decoded.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes one HTTP exchange. Implementations do not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// =============================================================================
// DELIVERY BACKEND
// =============================================================================

/// The three server calls behind a stepwise delivery.
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    async fn create_message(&self, message: &Message) -> Result<MessageDelivery, DigipostError>;

    async fn add_content(
        &self,
        link: &Link,
        content: BoxedContent,
    ) -> Result<MessageDelivery, DigipostError>;

    async fn send(&self, link: &Link) -> Result<MessageDelivery, DigipostError>;
}

// =============================================================================
// CLOCK
// =============================================================================

/// Time source for request dates and response freshness.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
