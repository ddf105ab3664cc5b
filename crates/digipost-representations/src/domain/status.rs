//! # Document Status
//!
//! Delivery status of a sent document and its attachments.

use super::delivery::Channel;
use super::link::{Link, Linked};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

xml_enum! {
    pub enum DeliveryStatus in "delivery-status" {
        NotDelivered => "NOT_DELIVERED",
        Delivered => "DELIVERED",
    }
}

xml_enum! {
    /// Whether the recipient has opened the document.
    pub enum Read in "read" {
        Yes => "Y",
        No => "N",
    }
}

xml_enum! {
    pub enum HashAlgorithm in "hash-algorithm" {
        None => "NONE",
        Md5 => "MD5",
        Sha256 => "SHA256",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentStatus {
    pub uuid: Uuid,
    pub delivery_status: DeliveryStatus,
    pub created: Option<DateTime<FixedOffset>>,
    pub delivered: Option<DateTime<FixedOffset>>,
    pub read: Option<Read>,
    pub channel: Option<Channel>,
    pub is_primary_document: bool,
    pub content_hash_algorithm: Option<HashAlgorithm>,
    pub content_hash: Option<String>,
    pub attachments: Vec<DocumentStatus>,
    pub links: Vec<Link>,
}

impl DocumentStatus {
    pub fn new(uuid: Uuid, delivery_status: DeliveryStatus) -> Self {
        Self {
            uuid,
            delivery_status,
            created: None,
            delivered: None,
            read: None,
            channel: None,
            is_primary_document: true,
            content_hash_algorithm: None,
            content_hash: None,
            attachments: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl Linked for DocumentStatus {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for DocumentStatus {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("uuid", &self.uuid)
            .attr("delivery-status", &self.delivery_status)
            .opt_attr("created", self.created.as_ref())
            .opt_attr("delivered", self.delivered.as_ref())
            .opt_attr("read", self.read.as_ref())
            .opt_attr("channel", self.channel.as_ref())
            .attr("is-primary-document", &self.is_primary_document)
            .opt_attr("content-hash-algorithm", self.content_hash_algorithm.as_ref())
            .opt_attr("content-hash", self.content_hash.as_ref())
            .records("attachment", &self.attachments)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let status = Self {
            uuid: element.required_attr("uuid")?,
            delivery_status: element.required_attr("delivery-status")?,
            created: element.optional_attr("created")?,
            delivered: element.optional_attr("delivered")?,
            read: element.optional_attr("read")?,
            channel: element.optional_attr("channel")?,
            is_primary_document: element.optional_attr("is-primary-document")?.unwrap_or(true),
            content_hash_algorithm: element.optional_attr("content-hash-algorithm")?,
            content_hash: element.optional_attr("content-hash")?,
            attachments: children.records("attachment")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(status)
    }
}

impl RootElement for DocumentStatus {
    const ROOT: &'static str = "document-status";
}
