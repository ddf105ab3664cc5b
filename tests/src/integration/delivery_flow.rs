//! # Delivery Flow Tests
//!
//! The stepwise delivery protocol through the full client stack:
//!
//! ```text
//! GET entry point -> POST message -> POST content (per document) -> POST send
//! ```
//!
//! Every request is signed by the client and checked by the fake server;
//! every response is signed by the fake server and verified by the client.

#[cfg(test)]
mod tests {
    use crate::fake_server::{client_signer, config, FakeDigipost, BROKER_ID};
    use chrono::DateTime;
    use digipost_client::{
        DeliveryState, DigipostApi, DigipostClient, DigipostError, DocumentEventsQuery,
        DocumentState, InboxPage,
    };
    use digipost_representations::{
        Channel, DeliveryStatus, Document, DocumentEvents, ErrorType, FileType, Link, Message,
        MessageStatus, Relation, SenderId, MEDIA_TYPE,
    };
    use http::{Method, StatusCode};
    use std::io::Cursor;
    use std::sync::Arc;
    use uuid::Uuid;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    const PDF: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

    fn client(fake: &FakeDigipost) -> DigipostClient {
        DigipostClient::with_transport(config(), client_signer(), Arc::new(fake.clone())).unwrap()
    }

    fn pdf_message(message_id: &str, uuid: Uuid) -> Message {
        Message::builder(message_id, Document::new(uuid, "Invoice", FileType::pdf()))
            .digipost_address("ola.nordmann#1234")
            .build()
            .unwrap()
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    /// Test: a single PDF to a Digipost address is created, uploaded and sent
    #[tokio::test]
    async fn test_single_document_delivery() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let uuid = Uuid::new_v4();

        let mut delivery = client
            .create_message(pdf_message("msg-single", uuid))
            .await
            .unwrap();
        assert_eq!(delivery.state(), DeliveryState::Created);
        assert_eq!(delivery.document_state(&uuid).unwrap(), DocumentState::Pending);

        let created = delivery.delivery().unwrap();
        let add_content_links = created
            .all_documents()
            .filter(|d| d.add_content_link().is_some())
            .count();
        assert_eq!(add_content_links, 1);
        assert!(created.send_link().is_some());

        delivery.add_content(uuid, Cursor::new(PDF.to_vec())).await.unwrap();
        assert_eq!(
            delivery.document_state(&uuid).unwrap(),
            DocumentState::ContentUploaded
        );
        assert_eq!(delivery.state(), DeliveryState::ContentAdded);

        let sent = delivery.send().await.unwrap();
        assert_eq!(delivery.state(), DeliveryState::Sent);
        assert_eq!(sent.message_id, "msg-single");
        assert_eq!(sent.delivery_method, Channel::Digipost);
        assert_eq!(sent.status, MessageStatus::Delivered);
        assert!(sent.attachments.is_empty());

        assert_eq!(fake.uploaded("msg-single", &uuid).unwrap().as_ref(), PDF);
        assert!(fake.is_sent("msg-single"));
    }

    /// Test: requests arrive in protocol order with the right content types
    #[tokio::test]
    async fn test_wire_sequence() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let uuid = Uuid::new_v4();

        let mut delivery = client
            .create_message(pdf_message("msg-wire", uuid))
            .await
            .unwrap();
        delivery.add_content(uuid, Cursor::new(PDF.to_vec())).await.unwrap();
        delivery.send().await.unwrap();

        let received = fake.received();
        let summary: Vec<(Method, &str)> = received
            .iter()
            .map(|r| (r.method.clone(), r.path.as_str()))
            .collect();
        let content_path = format!("/api/messages/msg-wire/documents/{uuid}/content");
        assert_eq!(
            summary,
            vec![
                (Method::GET, "/api/"),
                (Method::POST, "/api/messages"),
                (Method::POST, content_path.as_str()),
                (Method::POST, "/api/messages/msg-wire/send"),
            ]
        );
        assert_eq!(received[1].content_type.as_deref(), Some(MEDIA_TYPE));
        assert_eq!(
            received[2].content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(received[2].body.as_ref(), PDF);
        assert!(received[3].body.is_empty());
    }

    /// Test: the entry point is fetched once per client
    #[tokio::test]
    async fn test_entry_point_cached() {
        let fake = FakeDigipost::new();
        let client = client(&fake);

        for n in 0..3 {
            client
                .create_message(pdf_message(&format!("msg-cache-{n}"), Uuid::new_v4()))
                .await
                .unwrap();
        }
        let entry_point_fetches = fake
            .received()
            .iter()
            .filter(|r| r.method == Method::GET && r.path == "/api/")
            .count();
        assert_eq!(entry_point_fetches, 1);
    }

    /// Test: every document of a message must be uploaded before send
    #[tokio::test]
    async fn test_send_requires_every_document() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let primary = Uuid::new_v4();
        let attachment = Uuid::new_v4();
        let message = Message::builder(
            "msg-attachments",
            Document::new(primary, "Contract", FileType::pdf()),
        )
        .digipost_address("ola.nordmann#1234")
        .attachment(Document::new(attachment, "Terms", FileType::html()))
        .build()
        .unwrap();

        let mut delivery = client.create_message(message).await.unwrap();
        delivery.add_content(primary, Cursor::new(PDF.to_vec())).await.unwrap();

        let error = delivery.send().await.unwrap_err();
        assert!(matches!(error, DigipostError::IllegalState(_)), "{error:?}");
        assert!(!fake
            .received()
            .iter()
            .any(|r| r.path.ends_with("/send")));

        delivery
            .add_content(attachment, Cursor::new(b"<html/>".to_vec()))
            .await
            .unwrap();
        let sent = delivery.send().await.unwrap();
        assert_eq!(sent.attachments.len(), 1);
        assert!(fake.is_sent("msg-attachments"));
    }

    /// Test: reusing a consumed add-content link never reaches the server
    #[tokio::test]
    async fn test_add_content_link_single_use() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let uuid = Uuid::new_v4();

        let mut delivery = client
            .create_message(pdf_message("msg-reuse", uuid))
            .await
            .unwrap();
        delivery.add_content(uuid, Cursor::new(PDF.to_vec())).await.unwrap();
        let before = fake.received().len();

        let error = delivery
            .add_content(uuid, Cursor::new(PDF.to_vec()))
            .await
            .unwrap_err();
        assert!(
            matches!(error, DigipostError::LinkAlreadyUsed { relation: Relation::AddContent, .. }),
            "{error:?}"
        );
        assert_eq!(fake.received().len(), before);
    }

    // =========================================================================
    // REJECTIONS
    // =========================================================================

    /// Test: a reused message id comes back as an authenticated rejection
    #[tokio::test]
    async fn test_duplicate_message_id() {
        let fake = FakeDigipost::new();
        let client = client(&fake);

        client
            .create_message(pdf_message("msg-dup", Uuid::new_v4()))
            .await
            .unwrap();
        let error = client
            .create_message(pdf_message("msg-dup", Uuid::new_v4()))
            .await
            .unwrap_err();

        match error {
            DigipostError::ServerRejection {
                status,
                error_type,
                code,
                ..
            } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert_eq!(error_type, ErrorType::ClientData);
                assert_eq!(code.as_deref(), Some("DUPLICATE_MESSAGE_ID"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    /// Test: unknown resources are rejected with the server's error message
    #[tokio::test]
    async fn test_unknown_document_status() {
        let fake = FakeDigipost::new();
        let client = client(&fake);

        let error = client
            .document_status_by_uuid(SenderId(BROKER_ID), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(
            matches!(
                &error,
                DigipostError::ServerRejection { status, .. } if *status == StatusCode::NOT_FOUND
            ),
            "{error:?}"
        );
    }

    /// Test: document status by link and by uuid follows the delivery
    #[tokio::test]
    async fn test_document_status_via_link() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let uuid = Uuid::new_v4();

        let mut delivery = client
            .create_message(pdf_message("msg-status", uuid))
            .await
            .unwrap();
        let link = Link::new(
            Relation::DocumentStatus,
            fake.url(&format!("{BROKER_ID}/document/{uuid}/status")),
        );
        let pending = client.document_status(&link).await.unwrap();
        assert_eq!(pending.delivery_status, DeliveryStatus::NotDelivered);

        delivery.add_content(uuid, Cursor::new(PDF.to_vec())).await.unwrap();
        delivery.send().await.unwrap();
        let delivered = client
            .document_status_by_uuid(SenderId(BROKER_ID), uuid)
            .await
            .unwrap();
        assert_eq!(delivered.delivery_status, DeliveryStatus::Delivered);
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Test: event queries carry the window and paging parameters
    #[tokio::test]
    async fn test_document_events_query() {
        let fake = FakeDigipost::new();
        fake.set_events(DocumentEvents::default());
        let client = client(&fake);

        let from = DateTime::parse_from_rfc3339("2030-01-01T00:00:00+01:00").unwrap();
        let to = DateTime::parse_from_rfc3339("2030-01-02T00:00:00+01:00").unwrap();
        let events = client
            .document_events(&DocumentEventsQuery::new(from, to).page(200, 50))
            .await
            .unwrap();
        assert!(events.events.is_empty());

        let request = fake.received().pop().unwrap();
        assert_eq!(request.path, "/api/events");
        let query = request.query.unwrap();
        assert!(query.contains("offset=200"), "{query}");
        assert!(query.contains("maxResults=50"), "{query}");
        assert!(query.starts_with("from="), "{query}");
    }

    /// Test: an invalid event window is refused without a request
    #[tokio::test]
    async fn test_document_events_invalid_window() {
        let fake = FakeDigipost::new();
        let client = client(&fake);
        let from = DateTime::parse_from_rfc3339("2030-01-02T00:00:00Z").unwrap();
        let to = DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z").unwrap();

        let error = client
            .document_events(&DocumentEventsQuery::new(from, to))
            .await
            .unwrap_err();
        assert!(matches!(error, DigipostError::InvalidArgument(_)));
        assert!(fake.received().is_empty());
    }

    /// Test: inbox paging parameters reach the server
    #[tokio::test]
    async fn test_inbox_paging() {
        let fake = FakeDigipost::new();
        let client = client(&fake);

        let inbox = client
            .inbox(SenderId(BROKER_ID), InboxPage::new(10, 25).unwrap())
            .await
            .unwrap();
        assert!(inbox.documents.is_empty());

        let request = fake.received().pop().unwrap();
        assert_eq!(request.path, format!("/api/{BROKER_ID}/inbox"));
        assert_eq!(request.query.as_deref(), Some("offset=10&limit=25"));
    }
}
