//! # Mock Client Parity Tests
//!
//! Code written against [`DigipostApi`] runs unchanged on the in-memory mock
//! and on the real client, and both walk the same delivery states.

#[cfg(test)]
mod tests {
    use crate::fake_server::{client_signer, config, FakeDigipost};
    use chrono::DateTime;
    use digipost_client::{
        DeliveryState, DigipostApi, DigipostClient, DigipostError, InboxPage, MockDigipostClient,
    };
    use digipost_representations::{
        AuthenticationLevel, Channel, DeliveryStatus, Document, FileType, InboxDocument, Message,
        MessageDelivery, MessageStatus, SenderId,
    };
    use std::io::Cursor;
    use std::sync::Arc;
    use url::Url;
    use uuid::Uuid;

    /// What an application would write: one letter, start to finish.
    async fn send_letter(
        api: &dyn DigipostApi,
        message_id: &str,
        body: &[u8],
    ) -> Result<MessageDelivery, DigipostError> {
        let uuid = Uuid::new_v4();
        let message = Message::builder(message_id, Document::new(uuid, "Letter", FileType::pdf()))
            .digipost_address("ola.nordmann#1234")
            .build()?;
        let mut delivery = api.create_message(message).await?;
        delivery.add_content(uuid, Cursor::new(body.to_vec())).await?;
        let sent = delivery.send().await?;
        assert_eq!(delivery.state(), DeliveryState::Sent);
        Ok(sent)
    }

    fn inbox_document(id: i64) -> InboxDocument {
        InboxDocument {
            id,
            subject: format!("Document {id}"),
            sender: "Sender AS".to_string(),
            delivery_time: DateTime::parse_from_rfc3339("2030-01-01T12:00:00+01:00").unwrap(),
            first_accessed: None,
            authentication_level: AuthenticationLevel::Password,
            content_type: "application/pdf".to_string(),
            reference_from_sender: None,
            content_uri: Url::parse(&format!("https://mock.digipost.invalid/inbox/{id}/content"))
                .unwrap(),
            delete_uri: Some(
                Url::parse(&format!("https://mock.digipost.invalid/inbox/{id}")).unwrap(),
            ),
            attachments: Vec::new(),
        }
    }

    /// Test: mock and real client report the same outcome for one letter
    #[tokio::test]
    async fn test_same_outcome_on_mock_and_client() {
        let mock = MockDigipostClient::new();
        let fake = FakeDigipost::new();
        let client =
            DigipostClient::with_transport(config(), client_signer(), Arc::new(fake.clone()))
                .unwrap();

        let on_mock = send_letter(&mock, "parity-1", b"%PDF").await.unwrap();
        let on_client = send_letter(&client, "parity-1", b"%PDF").await.unwrap();

        for sent in [&on_mock, &on_client] {
            assert_eq!(sent.message_id, "parity-1");
            assert_eq!(sent.delivery_method, Channel::Digipost);
            assert_eq!(sent.status, MessageStatus::Delivered);
        }
        let recorded = mock.request("parity-1").unwrap();
        assert!(recorded.sent);
        assert_eq!(recorded.contents.values().next().unwrap().as_ref(), b"%PDF");
    }

    /// Test: the mock tracks document status through the delivery
    #[tokio::test]
    async fn test_mock_document_status() {
        let mock = MockDigipostClient::new();
        let uuid = Uuid::new_v4();
        let message = Message::builder("status-1", Document::new(uuid, "Letter", FileType::pdf()))
            .digipost_address("ola.nordmann#1234")
            .build()
            .unwrap();

        let mut delivery = mock.create_message(message).await.unwrap();
        let status = mock.document_status_by_uuid(SenderId(1), uuid).await.unwrap();
        assert_eq!(status.delivery_status, DeliveryStatus::NotDelivered);

        delivery.add_content(uuid, Cursor::new(b"x".to_vec())).await.unwrap();
        delivery.send().await.unwrap();
        let status = mock.document_status_by_uuid(SenderId(1), uuid).await.unwrap();
        assert_eq!(status.delivery_status, DeliveryStatus::Delivered);
        assert_eq!(status.channel, Some(Channel::Digipost));
    }

    /// Test: the mock pages and deletes inbox documents
    #[tokio::test]
    async fn test_mock_inbox() {
        let mock = MockDigipostClient::new();
        for id in 1..=5 {
            mock.add_inbox_document(inbox_document(id));
        }

        let page = mock
            .inbox(SenderId(1), InboxPage::new(2, 2).unwrap())
            .await
            .unwrap();
        let ids: Vec<i64> = page.documents.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![3, 4]);

        mock.delete_inbox_document(&inbox_document(3)).await.unwrap();
        let all = mock.inbox(SenderId(1), InboxPage::default()).await.unwrap();
        assert_eq!(all.documents.len(), 4);
        assert!(mock.delete_inbox_document(&inbox_document(3)).await.is_err());
    }

    /// Test: reset forgets messages, so a message id can be reused
    #[tokio::test]
    async fn test_mock_reset() {
        let mock = MockDigipostClient::new();
        send_letter(&mock, "reset-1", b"a").await.unwrap();
        assert!(send_letter(&mock, "reset-1", b"a").await.is_err());

        mock.reset();
        assert!(mock.requests().is_empty());
        send_letter(&mock, "reset-1", b"a").await.unwrap();
    }
}
