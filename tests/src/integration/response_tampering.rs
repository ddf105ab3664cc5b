//! # Response Tampering Tests
//!
//! Responses altered after the server signed them. The client must refuse
//! every one of them before the body is decoded, whatever the status code.

#[cfg(test)]
mod tests {
    use crate::fake_server::{
        client_signer, config, public_key_pem, rogue_key, server_key, FakeDigipost, Tamper,
        BROKER_ID,
    };
    use digipost_client::{
        DeliveryState, DigipostApi, DigipostClient, DigipostError, ErrorCode, TransportError,
    };
    use digipost_representations::{Document, ErrorType, FileType, Message, SenderId};
    use digipost_security::{RsaSha256Signer, SecurityError};
    use http::StatusCode;
    use std::io::Cursor;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn connected(fake: &FakeDigipost) -> DigipostClient {
        let client =
            DigipostClient::with_transport(config(), client_signer(), Arc::new(fake.clone()))
                .unwrap();
        client.service().entry_point().await.unwrap();
        client
    }

    fn message(message_id: &str, uuid: Uuid) -> Message {
        Message::builder(message_id, Document::new(uuid, "Letter", FileType::pdf()))
            .digipost_address("kari.nordmann#5678")
            .build()
            .unwrap()
    }

    /// Test: a forged signature is an authentication failure
    #[tokio::test]
    async fn test_forged_signature_rejected() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;

        fake.tamper_next(Tamper::Signature);
        let error = client
            .create_message(message("msg-forged", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(
            error,
            DigipostError::AuthenticationFailure(SecurityError::SignatureMismatch)
        );
    }

    /// Test: a body altered in transit is reported as corruption
    #[tokio::test]
    async fn test_altered_body_rejected() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;

        fake.tamper_next(Tamper::Body);
        let error = client
            .create_message(message("msg-altered", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(
            matches!(error, DigipostError::Transport(TransportError::BodyCorrupted(_))),
            "{error:?}"
        );
        assert_eq!(error.code(), ErrorCode::Transport);
    }

    /// Test: a response answering another request is a replay
    #[tokio::test]
    async fn test_foreign_nonce_rejected() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;

        fake.tamper_next(Tamper::Nonce);
        let error = client
            .create_message(message("msg-replayed", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(
            matches!(
                error,
                DigipostError::AuthenticationFailure(SecurityError::ReplayDetected { .. })
            ),
            "{error:?}"
        );
    }

    /// Test: an error response is verified before it is read as a rejection
    #[tokio::test]
    async fn test_tampered_error_response_rejected() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;

        fake.tamper_next(Tamper::Signature);
        let error = client
            .document_status_by_uuid(SenderId(BROKER_ID), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(error.code(), ErrorCode::AuthenticationFailure, "{error:?}");

        let untampered = client
            .document_status_by_uuid(SenderId(BROKER_ID), Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(untampered.code(), ErrorCode::ServerRejection, "{untampered:?}");
    }

    /// Test: raw content is withheld when its digest does not match
    #[tokio::test]
    async fn test_tampered_content_withheld() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;

        fake.tamper_next(Tamper::Body);
        let result = client.content("events").await;
        assert!(
            matches!(result, Err(DigipostError::Transport(TransportError::BodyCorrupted(_)))),
            "{result:?}"
        );
    }

    /// Test: a tampered upload response fails the delivery for good
    #[tokio::test]
    async fn test_tampered_upload_fails_delivery() {
        let fake = FakeDigipost::new();
        let client = connected(&fake).await;
        let uuid = Uuid::new_v4();

        let mut delivery = client
            .create_message(message("msg-upload", uuid))
            .await
            .unwrap();
        fake.tamper_next(Tamper::Signature);
        let error = delivery
            .add_content(uuid, Cursor::new(b"%PDF-1.4".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(error.code(), ErrorCode::AuthenticationFailure);
        assert_eq!(
            delivery.state(),
            DeliveryState::Failed(ErrorCode::AuthenticationFailure)
        );

        let error = delivery.send().await.unwrap_err();
        assert!(matches!(error, DigipostError::IllegalState(_)), "{error:?}");
        assert!(!fake.is_sent("msg-upload"));
    }

    /// Test: a failed entry-point exchange is retried by the next operation
    #[tokio::test]
    async fn test_entry_point_failure_not_cached() {
        let fake = FakeDigipost::new();
        let client =
            DigipostClient::with_transport(config(), client_signer(), Arc::new(fake.clone()))
                .unwrap();

        fake.tamper_next(Tamper::Signature);
        let error = client
            .create_message(message("msg-retry", Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(error.code(), ErrorCode::AuthenticationFailure);

        client
            .create_message(message("msg-retry", Uuid::new_v4()))
            .await
            .unwrap();
    }

    /// Test: requests signed with an unregistered key are refused by the server
    #[tokio::test]
    async fn test_unregistered_key_refused() {
        let fake = FakeDigipost::new();
        let signer = Arc::new(RsaSha256Signer::new(rogue_key().clone()));
        let pinned = config().with_server_certificate(public_key_pem(server_key()));
        let client = DigipostClient::with_transport(pinned, signer, Arc::new(fake.clone())).unwrap();

        let error = client.service().entry_point().await.unwrap_err();
        match error {
            DigipostError::ServerRejection {
                status, error_type, ..
            } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(error_type, ErrorType::ClientTechnical);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
