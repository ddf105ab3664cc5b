//! # Message Delivery
//!
//! The server's view of a message being delivered. Returned when the message
//! is created (with `add-content` and `send` links), after each upload and
//! after sending.

use super::document::Document;
use super::link::{Link, Linked, Relation};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

xml_enum! {
    /// How the message reaches the recipient.
    pub enum Channel in "channel" {
        Digipost => "DIGIPOST",
        Print => "PRINT",
    }
}

xml_enum! {
    pub enum MessageStatus in "message-status" {
        NotComplete => "NOT_COMPLETE",
        Complete => "COMPLETE",
        Delivered => "DELIVERED",
        DeliveredToPrint => "DELIVERED_TO_PRINT",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageDelivery {
    pub message_id: String,
    pub delivery_method: Channel,
    pub status: MessageStatus,
    pub delivery_time: Option<DateTime<FixedOffset>>,
    pub primary_document: Option<Document>,
    pub attachments: Vec<Document>,
    pub links: Vec<Link>,
}

impl MessageDelivery {
    pub fn new(message_id: impl Into<String>, delivery_method: Channel, status: MessageStatus) -> Self {
        Self {
            message_id: message_id.into(),
            delivery_method,
            status,
            delivery_time: None,
            primary_document: None,
            attachments: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Primary document first (if any), then attachments in order.
    pub fn all_documents(&self) -> impl Iterator<Item = &Document> {
        self.primary_document.iter().chain(self.attachments.iter())
    }

    pub fn document_by_uuid(&self, uuid: &Uuid) -> Result<&Document, RepresentationError> {
        self.all_documents()
            .find(|d| &d.uuid == uuid)
            .ok_or(RepresentationError::DocumentNotFound(*uuid))
    }

    /// `add-content` link the server offered for one document.
    pub fn add_content_link(&self, uuid: &Uuid) -> Option<&Link> {
        self.document_by_uuid(uuid)
            .ok()
            .and_then(Document::add_content_link)
    }

    pub fn send_link(&self) -> Option<&Link> {
        self.link(&Relation::Send)
    }

    pub fn is_delivered(&self) -> bool {
        matches!(
            self.status,
            MessageStatus::Delivered | MessageStatus::DeliveredToPrint
        )
    }
}

impl Linked for MessageDelivery {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for MessageDelivery {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("message-id", &self.message_id)
            .leaf("delivery-method", &self.delivery_method)
            .leaf("status", &self.status)
            .opt_leaf("delivery-time", self.delivery_time.as_ref())
            .opt_record("primary-document", self.primary_document.as_ref())
            .records("attachment", &self.attachments)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let delivery = Self {
            message_id: children.leaf("message-id")?,
            delivery_method: children.leaf("delivery-method")?,
            status: children.leaf("status")?,
            delivery_time: children.opt_leaf("delivery-time")?,
            primary_document: children.opt_record("primary-document")?,
            attachments: children.records("attachment")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(delivery)
    }
}

impl RootElement for MessageDelivery {
    const ROOT: &'static str = "message-delivery";
}
