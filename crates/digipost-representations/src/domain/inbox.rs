//! # Inbox
//!
//! Documents received by an organisation's own Digipost inbox.

use super::document::AuthenticationLevel;
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset};
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboxDocument {
    pub id: i64,
    pub subject: String,
    pub sender: String,
    pub delivery_time: DateTime<FixedOffset>,
    pub first_accessed: Option<DateTime<FixedOffset>>,
    pub authentication_level: AuthenticationLevel,
    pub content_type: String,
    pub reference_from_sender: Option<String>,
    pub content_uri: Url,
    /// Only the top-level document can be deleted.
    pub delete_uri: Option<Url>,
    pub attachments: Vec<InboxDocument>,
}

impl XmlCodec for InboxDocument {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("id", &self.id)
            .leaf("subject", &self.subject)
            .leaf("sender", &self.sender)
            .leaf("delivery-time", &self.delivery_time)
            .opt_leaf("first-accessed", self.first_accessed.as_ref())
            .leaf("authentication-level", &self.authentication_level)
            .leaf("content-type", &self.content_type)
            .opt_leaf("reference-from-sender", self.reference_from_sender.as_ref())
            .leaf("content-uri", &self.content_uri)
            .opt_leaf("delete-uri", self.delete_uri.as_ref())
            .records("attachment", &self.attachments)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let document = Self {
            id: children.leaf("id")?,
            subject: children.leaf("subject")?,
            sender: children.leaf("sender")?,
            delivery_time: children.leaf("delivery-time")?,
            first_accessed: children.opt_leaf("first-accessed")?,
            authentication_level: children.leaf("authentication-level")?,
            content_type: children.leaf("content-type")?,
            reference_from_sender: children.opt_leaf("reference-from-sender")?,
            content_uri: children.leaf("content-uri")?,
            delete_uri: children.opt_leaf("delete-uri")?,
            attachments: children.records("attachment")?,
        };
        children.finish()?;
        Ok(document)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inbox {
    pub documents: Vec<InboxDocument>,
}

impl XmlCodec for Inbox {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name).records("document", &self.documents)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let inbox = Self {
            documents: children.records("document")?,
        };
        children.finish()?;
        Ok(inbox)
    }
}

impl RootElement for Inbox {
    const ROOT: &'static str = "inbox";
}
