//! # Adapters Layer
//!
//! Concrete key material: the RSA signer and the server certificate.

pub mod certificate;
pub mod rsa_signer;
