//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::SecurityError;

/// Produces signatures over canonical request strings.
///
/// Implementations hold the account's private key for the lifetime of the
/// client and must be safe for concurrent use (`Send + Sync`): one signer is
/// shared by every delivery running on a client.
pub trait Signer: Send + Sync {
    /// Sign the UTF-8 bytes of `canonical`.
    fn sign(&self, canonical: &str) -> Result<Vec<u8>, SecurityError>;
}
