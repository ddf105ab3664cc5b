//! # Document Content
//!
//! Uploads are signed over the SHA-256 of the body, so a source is read once
//! to compute the digest and length, rewound, and handed to the transport as
//! a stream. Whole documents are never held in memory.

use crate::domain::errors::TransportError;
use crate::ports::outbound::{BoxedContent, RequestBody};
use digipost_security::{ContentDigest, ContentDigester};
use std::io::SeekFrom;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

const CHUNK_SIZE: usize = 64 * 1024;

/// Content whose digest is known, positioned for streaming.
pub struct PreparedContent {
    pub digest: ContentDigest,
    pub length: u64,
    source: BoxedContent,
}

impl PreparedContent {
    /// Digest everything from the current position to the end, then seek back.
    pub async fn prepare(mut source: BoxedContent) -> Result<Self, TransportError> {
        let start = source.stream_position().await?;
        let mut digester = ContentDigester::new();
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let read = source.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            digester.update(&chunk[..read]);
        }
        source.seek(SeekFrom::Start(start)).await?;

        let length = digester.length();
        tracing::trace!(length, "Prepared content for upload");
        Ok(Self {
            digest: digester.finish(),
            length,
            source,
        })
    }

    pub fn into_body(self) -> RequestBody {
        RequestBody::Stream {
            reader: self.source,
            length: self.length,
        }
    }
}
