//! # Stepwise Delivery
//!
//! A message is delivered in three steps driven by server links:
//!
//! ```text
//! New --create--> Created --add_content--> ContentAdded --send--> Sent
//!                    |            (repeat)        |
//!                    +---------------send---------+
//! any backend error ---------------------------------------> Failed(code)
//! ```
//!
//! Every link is single-use and is marked used before its request is issued.
//! A delivery is owned by one task; methods take `&mut self`.

use crate::domain::errors::{DigipostError, ErrorCode};
use crate::ports::outbound::{ContentSource, DeliveryBackend};
use digipost_representations::{Link, Message, MessageDelivery};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryState {
    New,
    Created,
    ContentAdded,
    Sent,
    Failed(ErrorCode),
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed(_))
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("New"),
            Self::Created => f.write_str("Created"),
            Self::ContentAdded => f.write_str("ContentAdded"),
            Self::Sent => f.write_str("Sent"),
            Self::Failed(code) => write!(f, "Failed({code})"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentState {
    Pending,
    ContentUploaded,
}

/// Which facade operation started the delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Digital delivery, printed by the server when the recipient is not in Digipost.
    WithPrintFallback,
    /// Physical mail only. Stays `Created` while content is added.
    PrintOnly,
}

pub struct OngoingDelivery {
    kind: DeliveryKind,
    backend: Arc<dyn DeliveryBackend>,
    message: Message,
    state: DeliveryState,
    delivery: Option<MessageDelivery>,
    documents: Vec<(Uuid, DocumentState)>,
    /// Add-content links offered at creation, one per document needing content.
    content_links: HashMap<Uuid, Link>,
    send_link: Option<Link>,
    used_links: HashSet<Url>,
}

impl OngoingDelivery {
    /// Prepare a delivery. Print-only deliveries require a direct-print message.
    pub fn new(
        kind: DeliveryKind,
        message: Message,
        backend: Arc<dyn DeliveryBackend>,
    ) -> Result<Self, DigipostError> {
        if kind == DeliveryKind::PrintOnly && !message.is_direct_print() {
            return Err(DigipostError::InvalidArgument(format!(
                "message {} is not addressed for direct print",
                message.message_id()
            )));
        }
        let documents = message
            .all_documents()
            .map(|d| (d.uuid, DocumentState::Pending))
            .collect();
        Ok(Self {
            kind,
            backend,
            message,
            state: DeliveryState::New,
            delivery: None,
            documents,
            content_links: HashMap::new(),
            send_link: None,
            used_links: HashSet::new(),
        })
    }

    pub fn kind(&self) -> DeliveryKind {
        self.kind
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Latest server view of the delivery.
    pub fn delivery(&self) -> Option<&MessageDelivery> {
        self.delivery.as_ref()
    }

    pub fn document_state(&self, uuid: &Uuid) -> Result<DocumentState, DigipostError> {
        self.documents
            .iter()
            .find(|(id, _)| id == uuid)
            .map(|(_, state)| *state)
            .ok_or(DigipostError::DocumentNotFound(*uuid))
    }

    /// Register the message with the server.
    pub async fn create(&mut self) -> Result<&MessageDelivery, DigipostError> {
        if self.state != DeliveryState::New {
            return Err(self.illegal("create"));
        }

        let result = self.backend.create_message(&self.message).await;
        let delivery = self.track(result)?;
        self.content_links = delivery
            .all_documents()
            .filter_map(|d| d.add_content_link().map(|link| (d.uuid, link.clone())))
            .collect();
        self.transition(DeliveryState::Created);
        Ok(self.record(delivery))
    }

    /// Upload the content of one document through its add-content link.
    ///
    /// Documents marked `pre_encrypt` are refused: their content would reach
    /// the server unencrypted.
    pub async fn add_content<C>(
        &mut self,
        uuid: Uuid,
        content: C,
    ) -> Result<&MessageDelivery, DigipostError>
    where
        C: ContentSource + 'static,
    {
        if !matches!(self.state, DeliveryState::Created | DeliveryState::ContentAdded) {
            return Err(self.illegal("add content"));
        }
        if self.message.document_by_uuid(&uuid)?.pre_encrypt {
            return Err(DigipostError::InvalidArgument(format!(
                "document {uuid} is marked pre-encrypt; client-side encryption is not supported"
            )));
        }

        let link = self.content_links.get(&uuid).cloned().ok_or_else(|| {
            DigipostError::illegal_state(format!("no add-content link for document {uuid}"))
        })?;
        self.consume(&link)?;

        tracing::debug!(
            message_id = self.message.message_id(),
            document = %uuid,
            uri = %link.uri,
            "Adding content"
        );
        let result = self.backend.add_content(&link, Box::new(content)).await;
        let delivery = self.track(result)?;

        if let Some(entry) = self.documents.iter_mut().find(|(id, _)| *id == uuid) {
            entry.1 = DocumentState::ContentUploaded;
        }
        if self.kind == DeliveryKind::WithPrintFallback {
            self.transition(DeliveryState::ContentAdded);
        }
        Ok(self.record(delivery))
    }

    /// Submit the message. Every document offered an add-content link must
    /// have its content uploaded first.
    pub async fn send(&mut self) -> Result<MessageDelivery, DigipostError> {
        if !matches!(self.state, DeliveryState::Created | DeliveryState::ContentAdded) {
            return Err(self.illegal("send"));
        }

        let pending: Vec<String> = self
            .documents
            .iter()
            .filter(|(id, state)| {
                *state == DocumentState::Pending && self.content_links.contains_key(id)
            })
            .map(|(id, _)| id.to_string())
            .collect();
        if !pending.is_empty() {
            return Err(DigipostError::illegal_state(format!(
                "content missing for documents {}",
                pending.join(", ")
            )));
        }

        let link = self
            .send_link
            .clone()
            .ok_or_else(|| DigipostError::illegal_state("delivery has no send link"))?;
        self.consume(&link)?;

        let result = self.backend.send(&link).await;
        let delivery = self.track(result)?;
        self.transition(DeliveryState::Sent);
        tracing::info!(
            message_id = self.message.message_id(),
            channel = %delivery.delivery_method,
            status = %delivery.status,
            "Message sent"
        );
        self.record(delivery.clone());
        Ok(delivery)
    }

    /// Keep the latest server view and the newest send link it offers.
    fn record(&mut self, delivery: MessageDelivery) -> &MessageDelivery {
        if let Some(link) = delivery.send_link() {
            self.send_link = Some(link.clone());
        }
        self.delivery.insert(delivery)
    }

    fn consume(&mut self, link: &Link) -> Result<(), DigipostError> {
        if !self.used_links.insert(link.uri.clone()) {
            return Err(DigipostError::LinkAlreadyUsed {
                relation: link.relation.clone(),
                uri: link.uri.clone(),
            });
        }
        Ok(())
    }

    fn track(
        &mut self,
        result: Result<MessageDelivery, DigipostError>,
    ) -> Result<MessageDelivery, DigipostError> {
        if let Err(error) = &result {
            tracing::debug!(
                message_id = self.message.message_id(),
                code = %error.code(),
                "Delivery failed: {}",
                error
            );
            self.transition(DeliveryState::Failed(error.code()));
        }
        result
    }

    fn transition(&mut self, to: DeliveryState) {
        tracing::debug!(
            message_id = self.message.message_id(),
            from = %self.state,
            to = %to,
            "Delivery state transition"
        );
        self.state = to;
    }

    fn illegal(&self, operation: &str) -> DigipostError {
        DigipostError::illegal_state(format!("cannot {operation} in state {}", self.state))
    }
}

impl fmt::Debug for OngoingDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OngoingDelivery")
            .field("message_id", &self.message.message_id())
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("documents", &self.documents)
            .finish_non_exhaustive()
    }
}
