//! # Certificate Trust Tests
//!
//! Which key the client trusts for response signatures:
//!
//! - a pinned certificate from configuration, always
//! - otherwise the certificate the entry point publishes, but only if the
//!   entry-point response itself verifies against it

#[cfg(test)]
mod tests {
    use crate::fake_server::{
        client_signer, config, public_key_pem, rogue_key, server_key, FakeDigipost,
        SERVER_CERTIFICATE,
    };
    use digipost_client::{ConfigError, DigipostApi, DigipostClient, DigipostError};
    use digipost_representations::{Document, ErrorType, FileType, Message};
    use digipost_security::SecurityError;
    use http::StatusCode;
    use std::sync::Arc;
    use uuid::Uuid;

    fn client(fake: &FakeDigipost, pinned: Option<String>) -> DigipostClient {
        let mut config = config();
        if let Some(pem) = pinned {
            config = config.with_server_certificate(pem);
        }
        DigipostClient::with_transport(config, client_signer(), Arc::new(fake.clone())).unwrap()
    }

    fn message() -> Message {
        Message::builder(
            Uuid::new_v4().to_string(),
            Document::new(Uuid::new_v4(), "Notice", FileType::pdf()),
        )
        .digipost_address("per.hansen#9012")
        .build()
        .unwrap()
    }

    /// Test: without a pin the published certificate is adopted
    #[tokio::test]
    async fn test_trust_on_first_use() {
        let fake = FakeDigipost::new();
        let client = client(&fake, None);

        let entry_point = client.service().entry_point().await.unwrap();
        assert_eq!(entry_point.certificate, public_key_pem(server_key()));
        client.create_message(message()).await.unwrap();
    }

    /// Test: an X.509 certificate published by the entry point is adopted
    #[tokio::test]
    async fn test_trust_on_first_use_x509() {
        let fake = FakeDigipost::with_certificate();
        let client = client(&fake, None);

        let entry_point = client.service().entry_point().await.unwrap();
        assert!(entry_point.certificate.contains("-----BEGIN CERTIFICATE-----"));
        client.create_message(message()).await.unwrap();
    }

    /// Test: a pinned X.509 certificate verifies its own key and no other
    #[tokio::test]
    async fn test_pinned_x509_certificate() {
        let certified = FakeDigipost::with_certificate();
        let trusting = client(&certified, Some(SERVER_CERTIFICATE.to_string()));
        trusting.create_message(message()).await.unwrap();

        let other = FakeDigipost::new();
        let refusing = client(&other, Some(SERVER_CERTIFICATE.to_string()));
        let error = refusing.create_message(message()).await.unwrap_err();
        assert_eq!(
            error,
            DigipostError::AuthenticationFailure(SecurityError::SignatureMismatch)
        );
    }

    /// Test: a published certificate that did not sign the entry point is refused
    #[tokio::test]
    async fn test_substituted_certificate_refused() {
        let fake = FakeDigipost::new().advertising(public_key_pem(rogue_key()));
        let client = client(&fake, None);

        let error = client.service().entry_point().await.unwrap_err();
        assert_eq!(
            error,
            DigipostError::AuthenticationFailure(SecurityError::SignatureMismatch)
        );
    }

    /// Test: a pinned certificate wins over whatever the entry point publishes
    #[tokio::test]
    async fn test_pinned_certificate_wins() {
        let fake = FakeDigipost::new().advertising(public_key_pem(rogue_key()));
        let client = client(&fake, Some(public_key_pem(server_key())));

        client.service().entry_point().await.unwrap();
        client.create_message(message()).await.unwrap();
    }

    /// Test: responses from a server whose key does not match the pin are refused
    #[tokio::test]
    async fn test_wrong_pin_refused() {
        let fake = FakeDigipost::new();
        let client = client(&fake, Some(public_key_pem(rogue_key())));

        let error = client.create_message(message()).await.unwrap_err();
        assert_eq!(
            error,
            DigipostError::AuthenticationFailure(SecurityError::SignatureMismatch)
        );
    }

    /// Test: an unavailable entry point cannot bootstrap trust
    #[tokio::test]
    async fn test_entry_point_unavailable_without_pin() {
        let fake = FakeDigipost::new();
        fake.fail_entry_point(StatusCode::SERVICE_UNAVAILABLE);
        let client = client(&fake, None);

        match client.service().entry_point().await.unwrap_err() {
            DigipostError::ServerRejection {
                status, error_type, ..
            } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(error_type, ErrorType::None);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    /// Test: with a pin the entry point's own error message is reported
    #[tokio::test]
    async fn test_entry_point_unavailable_with_pin() {
        let fake = FakeDigipost::new();
        fake.fail_entry_point(StatusCode::SERVICE_UNAVAILABLE);
        let client = client(&fake, Some(public_key_pem(server_key())));

        match client.service().entry_point().await.unwrap_err() {
            DigipostError::ServerRejection {
                status,
                error_type,
                message,
                ..
            } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(error_type, ErrorType::Server);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    /// Test: an unparseable pin is a configuration error before any request
    #[tokio::test]
    async fn test_unparseable_pin() {
        let fake = FakeDigipost::new();
        let config = config().with_server_certificate("-----BEGIN CERTIFICATE-----\nnope\n");

        let error =
            DigipostClient::with_transport(config, client_signer(), Arc::new(fake.clone()))
                .unwrap_err();
        assert!(
            matches!(
                error,
                DigipostError::Configuration(ConfigError::InvalidCertificate(_))
            ),
            "{error:?}"
        );
        assert!(fake.received().is_empty());
    }
}
