//! # Server Certificate
//!
//! The Digipost public key used to verify response signatures. The entry
//! point publishes it as an X.509 certificate; a bare `PUBLIC KEY` PEM is
//! accepted as well for pinned configurations.

use crate::domain::errors::SecurityError;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha2::Sha256;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

const CERTIFICATE_BLOCK: &str = "-----BEGIN CERTIFICATE-----";

/// Verifies signatures made with the server's private key.
#[derive(Clone, Debug)]
pub struct ServerCertificate {
    public_key: RsaPublicKey,
    verifying_key: VerifyingKey<Sha256>,
}

impl ServerCertificate {
    pub fn from_public_key(public_key: RsaPublicKey) -> Self {
        Self {
            verifying_key: VerifyingKey::<Sha256>::new(public_key.clone()),
            public_key,
        }
    }

    /// Parse a `CERTIFICATE` or `PUBLIC KEY` PEM block.
    pub fn from_pem(pem: &str) -> Result<Self, SecurityError> {
        let pem = pem.trim();
        let public_key = if pem.contains(CERTIFICATE_BLOCK) {
            let certificate = Certificate::from_pem(pem.as_bytes())
                .map_err(|e| SecurityError::CertificateParse(e.to_string()))?;
            let spki = certificate
                .tbs_certificate
                .subject_public_key_info
                .to_der()
                .map_err(|e| SecurityError::CertificateParse(e.to_string()))?;
            RsaPublicKey::from_public_key_der(&spki)
                .map_err(|e| SecurityError::CertificateParse(e.to_string()))?
        } else {
            RsaPublicKey::from_public_key_pem(pem)
                .map_err(|e| SecurityError::CertificateParse(e.to_string()))?
        };
        Ok(Self::from_public_key(public_key))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// True when `signature` is a valid RSA/SHA-256 signature over `canonical`.
    pub fn verify(&self, canonical: &str, signature: &[u8]) -> bool {
        let Ok(signature) = Signature::try_from(signature) else {
            return false;
        };
        self.verifying_key
            .verify(canonical.as_bytes(), &signature)
            .is_ok()
    }
}

impl PartialEq for ServerCertificate {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for ServerCertificate {}
