//! # In-memory Digipost
//!
//! [`MockDigipostClient`] implements [`DigipostApi`] without a server. It
//! hands out links like the real API, records every message with the content
//! uploaded for it, and answers read operations from expectations set by the
//! test.

use crate::delivery::{DeliveryKind, OngoingDelivery};
use crate::domain::errors::DigipostError;
use crate::domain::queries::{DocumentEventsQuery, InboxPage};
use crate::ports::inbound::DigipostApi;
use crate::ports::outbound::{BoxedContent, DeliveryBackend};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{FixedOffset, Utc};
use digipost_representations::{
    AdditionalData, Autocomplete, Channel, DeliveryStatus, Document, DocumentEvents,
    DocumentStatus, ErrorType, Identification, IdentificationResult, IdentificationResultCode,
    Inbox, InboxDocument, Link, Message, MessageDelivery, MessageStatus, Recipients, Relation,
    SenderId, SenderInformation, SenderStatus, UserAccount, UserInformation,
};
use http::StatusCode;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use url::Url;
use uuid::Uuid;

const MOCK_BASE: &str = "https://mock.digipost.invalid/";

/// A message as received by the mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockRequest {
    pub message: Message,
    pub contents: HashMap<Uuid, Bytes>,
    pub sent: bool,
}

#[derive(Default)]
struct MockState {
    requests: HashMap<String, MockRequest>,
    content_links: HashMap<Url, (String, Uuid)>,
    send_links: HashMap<Url, String>,
    expected_events: Option<DocumentEvents>,
    expected_content: Option<Bytes>,
    identification_result: Option<IdentificationResult>,
    inbox: Vec<InboxDocument>,
    additional_data: Vec<(Url, AdditionalData)>,
}

#[derive(Clone, Default)]
pub struct MockDigipostClient {
    state: Arc<Mutex<MockState>>,
}

impl MockDigipostClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message created so far, by message id.
    pub fn requests(&self) -> HashMap<String, MockRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request(&self, message_id: &str) -> Option<MockRequest> {
        self.state.lock().requests.get(message_id).cloned()
    }

    pub fn add_expected_document_events(&self, events: DocumentEvents) {
        self.state.lock().expected_events = Some(events);
    }

    pub fn add_expected_content(&self, content: impl Into<Bytes>) {
        self.state.lock().expected_content = Some(content.into());
    }

    pub fn set_identification_result(&self, result: IdentificationResult) {
        self.state.lock().identification_result = Some(result);
    }

    pub fn add_inbox_document(&self, document: InboxDocument) {
        self.state.lock().inbox.push(document);
    }

    /// Data attached through `add_data`, with the link it was posted to.
    pub fn additional_data(&self) -> Vec<(Url, AdditionalData)> {
        self.state.lock().additional_data.clone()
    }

    /// Forget all requests and expectations.
    pub fn reset(&self) {
        *self.state.lock() = MockState::default();
    }

    fn backend(&self) -> Arc<dyn DeliveryBackend> {
        Arc::new(MockBackend {
            state: self.state.clone(),
        })
    }
}

fn mock_url(path: &str) -> Result<Url, DigipostError> {
    Url::parse(MOCK_BASE)
        .and_then(|base| base.join(path))
        .map_err(|e| DigipostError::InvalidArgument(e.to_string()))
}

fn now() -> chrono::DateTime<FixedOffset> {
    Utc::now().fixed_offset()
}

// =============================================================================
// DELIVERY BACKEND
// =============================================================================

struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Server view of a message: documents still missing content carry an
    /// add-content link; unsent messages carry a send link.
    fn delivery_view(
        state: &MockState,
        message_id: &str,
    ) -> Result<MessageDelivery, DigipostError> {
        let request = state
            .requests
            .get(message_id)
            .ok_or_else(|| DigipostError::InvalidArgument(format!("unknown message {message_id}")))?;
        let message = &request.message;

        let channel = if message.is_direct_print() {
            Channel::Print
        } else {
            Channel::Digipost
        };
        let status = match (request.sent, channel) {
            (false, _) => MessageStatus::NotComplete,
            (true, Channel::Digipost) => MessageStatus::Delivered,
            (true, Channel::Print) => MessageStatus::DeliveredToPrint,
        };
        let mut delivery = MessageDelivery::new(message_id, channel, status);

        let view = |document: &Document| -> Result<Document, DigipostError> {
            let mut document = document.clone();
            document.links.clear();
            if !request.sent && !request.contents.contains_key(&document.uuid) {
                document.links.push(Link::new(
                    Relation::AddContent,
                    mock_url(&format!("messages/{message_id}/documents/{}/content", document.uuid))?,
                ));
            }
            Ok(document)
        };
        delivery.primary_document = Some(view(message.primary_document())?);
        delivery.attachments = message
            .attachments()
            .iter()
            .map(view)
            .collect::<Result<_, _>>()?;

        if request.sent {
            delivery.delivery_time = Some(now());
        } else {
            delivery.links.push(Link::new(
                Relation::Send,
                mock_url(&format!("messages/{message_id}/send"))?,
            ));
        }
        Ok(delivery)
    }
}

#[async_trait]
impl DeliveryBackend for MockBackend {
    async fn create_message(&self, message: &Message) -> Result<MessageDelivery, DigipostError> {
        let mut state = self.state.lock();
        let message_id = message.message_id().to_string();
        if state.requests.contains_key(&message_id) {
            return Err(DigipostError::ServerRejection {
                status: StatusCode::CONFLICT,
                error_type: ErrorType::ClientData,
                code: Some("DUPLICATE_MESSAGE_ID".to_string()),
                message: format!("message id {message_id} already used"),
            });
        }
        state.requests.insert(
            message_id.clone(),
            MockRequest {
                message: message.clone(),
                contents: HashMap::new(),
                sent: false,
            },
        );

        let delivery = Self::delivery_view(&state, &message_id)?;
        for document in delivery.all_documents() {
            if let Some(link) = document.add_content_link() {
                state
                    .content_links
                    .insert(link.uri.clone(), (message_id.clone(), document.uuid));
            }
        }
        if let Some(link) = delivery.send_link() {
            state.send_links.insert(link.uri.clone(), message_id.clone());
        }
        tracing::debug!(message_id = %message_id, "Mock message created");
        Ok(delivery)
    }

    async fn add_content(
        &self,
        link: &Link,
        mut content: BoxedContent,
    ) -> Result<MessageDelivery, DigipostError> {
        let mut bytes = Vec::new();
        content.read_to_end(&mut bytes).await?;

        let mut state = self.state.lock();
        let (message_id, uuid) = state
            .content_links
            .get(&link.uri)
            .cloned()
            .ok_or_else(|| DigipostError::InvalidArgument(format!("unknown link {}", link.uri)))?;
        if let Some(request) = state.requests.get_mut(&message_id) {
            request.contents.insert(uuid, Bytes::from(bytes));
        }
        Self::delivery_view(&state, &message_id)
    }

    async fn send(&self, link: &Link) -> Result<MessageDelivery, DigipostError> {
        let mut state = self.state.lock();
        let message_id = state
            .send_links
            .get(&link.uri)
            .cloned()
            .ok_or_else(|| DigipostError::InvalidArgument(format!("unknown link {}", link.uri)))?;
        if let Some(request) = state.requests.get_mut(&message_id) {
            request.sent = true;
        }
        Self::delivery_view(&state, &message_id)
    }
}

// =============================================================================
// FACADE
// =============================================================================

#[async_trait]
impl DigipostApi for MockDigipostClient {
    async fn create_message(&self, message: Message) -> Result<OngoingDelivery, DigipostError> {
        let mut delivery =
            OngoingDelivery::new(DeliveryKind::WithPrintFallback, message, self.backend())?;
        delivery.create().await?;
        Ok(delivery)
    }

    async fn create_print_only_message(
        &self,
        message: Message,
    ) -> Result<OngoingDelivery, DigipostError> {
        let mut delivery = OngoingDelivery::new(DeliveryKind::PrintOnly, message, self.backend())?;
        delivery.create().await?;
        Ok(delivery)
    }

    async fn identify_recipient(
        &self,
        _identification: &Identification,
    ) -> Result<IdentificationResult, DigipostError> {
        Ok(self
            .state
            .lock()
            .identification_result
            .clone()
            .unwrap_or(IdentificationResult {
                result: IdentificationResultCode::Digipost,
                detail: None,
            }))
    }

    async fn add_data(&self, link: &Link, data: &AdditionalData) -> Result<(), DigipostError> {
        if link.relation != Relation::AddData {
            return Err(DigipostError::InvalidArgument(format!(
                "expected an add-data link, got {}",
                link.relation
            )));
        }
        self.state
            .lock()
            .additional_data
            .push((link.uri.clone(), data.clone()));
        Ok(())
    }

    async fn search(&self, _query: &str) -> Result<Recipients, DigipostError> {
        Ok(Recipients::default())
    }

    async fn autocomplete(&self, _query: &str) -> Result<Autocomplete, DigipostError> {
        Ok(Autocomplete::default())
    }

    async fn document_events(
        &self,
        query: &DocumentEventsQuery,
    ) -> Result<DocumentEvents, DigipostError> {
        query.validate()?;
        Ok(self
            .state
            .lock()
            .expected_events
            .clone()
            .unwrap_or(DocumentEvents {
                events: Vec::new(),
                links: Vec::new(),
            }))
    }

    async fn sender_information(
        &self,
        sender_id: SenderId,
    ) -> Result<SenderInformation, DigipostError> {
        Ok(SenderInformation {
            sender_id: Some(sender_id),
            status: SenderStatus::ValidSender,
            supported_features: Vec::new(),
            links: Vec::new(),
        })
    }

    async fn sender_information_by_organisation(
        &self,
        _organisation_number: &str,
        _part_id: Option<&str>,
    ) -> Result<SenderInformation, DigipostError> {
        Ok(SenderInformation {
            sender_id: None,
            status: SenderStatus::ValidSender,
            supported_features: Vec::new(),
            links: Vec::new(),
        })
    }

    async fn document_status(&self, link: &Link) -> Result<DocumentStatus, DigipostError> {
        let uuid = link
            .uri
            .path_segments()
            .into_iter()
            .flatten()
            .find_map(|segment| Uuid::parse_str(segment).ok())
            .ok_or_else(|| {
                DigipostError::InvalidArgument(format!("no document in link {}", link.uri))
            })?;
        self.document_status_by_uuid(SenderId(0), uuid).await
    }

    async fn document_status_by_uuid(
        &self,
        _sender_id: SenderId,
        uuid: Uuid,
    ) -> Result<DocumentStatus, DigipostError> {
        let state = self.state.lock();
        let (request, document) = state
            .requests
            .values()
            .find_map(|r| r.message.document_by_uuid(&uuid).ok().map(|d| (r, d)))
            .ok_or(DigipostError::DocumentNotFound(uuid))?;

        let delivered = if request.sent {
            DeliveryStatus::Delivered
        } else {
            DeliveryStatus::NotDelivered
        };
        let mut status = DocumentStatus::new(document.uuid, delivered);
        status.is_primary_document = request.message.primary_document().uuid == uuid;
        if request.sent {
            status.delivered = Some(now());
            status.channel = Some(if request.message.is_direct_print() {
                Channel::Print
            } else {
                Channel::Digipost
            });
        }
        Ok(status)
    }

    async fn content(&self, _path: &str) -> Result<Bytes, DigipostError> {
        Ok(self.state.lock().expected_content.clone().unwrap_or_default())
    }

    async fn inbox(&self, _sender_id: SenderId, page: InboxPage) -> Result<Inbox, DigipostError> {
        let documents = self
            .state
            .lock()
            .inbox
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok(Inbox { documents })
    }

    async fn inbox_document_content(
        &self,
        _document: &InboxDocument,
    ) -> Result<Bytes, DigipostError> {
        Ok(self.state.lock().expected_content.clone().unwrap_or_default())
    }

    async fn delete_inbox_document(&self, document: &InboxDocument) -> Result<(), DigipostError> {
        let mut state = self.state.lock();
        let before = state.inbox.len();
        state.inbox.retain(|d| d.id != document.id);
        if state.inbox.len() == before {
            return Err(DigipostError::InvalidArgument(format!(
                "no inbox document {}",
                document.id
            )));
        }
        Ok(())
    }

    async fn create_or_activate_user_account(
        &self,
        _sender_id: SenderId,
        user: &UserInformation,
    ) -> Result<UserAccount, DigipostError> {
        Ok(UserAccount {
            digipost_address: format!("user#{}", user.personal_identification_number),
            links: Vec::new(),
        })
    }
}
