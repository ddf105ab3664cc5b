//! # Document Events
//!
//! What happened to sent documents: opened, printed, postmarked, failed
//! notifications. Event metadata is polymorphic on `xsi:type`.

use super::document::{AuthenticationLevel, SensitivityLevel};
use super::link::{Link, Linked, Relation};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement, XSI_TYPE};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

xml_enum! {
    pub enum DocumentEventType in "document-event-type" {
        Opened => "OPENED",
        MoveFilesFromPublicSector => "MOVE_FILES_FROM_PUBLIC_SECTOR",
        EmailNotificationFailed => "EMAIL_NOTIFICATION_FAILED",
        SmsNotificationFailed => "SMS_NOTIFICATION_FAILED",
        PrintFailed => "PRINT_FAILED",
        Postmarked => "POSTMARKED",
        Shredded => "SHREDDED",
    }
}

/// A document moved out of a public-sector mailbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub uuid: Uuid,
    pub content_type: Option<String>,
}

impl XmlCodec for DocumentMetadata {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("uuid", &self.uuid)
            .opt_attr("content-type", self.content_type.as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        Children::new(element).finish()?;
        Ok(Self {
            uuid: element.required_attr("uuid")?,
            content_type: element.optional_attr("content-type")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveFilesFromPublicSector {
    pub opened: Option<bool>,
    pub delivery_time: DateTime<FixedOffset>,
    pub subject: Option<String>,
    pub sensitivity_level: Option<SensitivityLevel>,
    pub authentication_level: Option<AuthenticationLevel>,
    pub certificate: Option<String>,
    pub destination_mailbox: Option<String>,
    pub destination_mailbox_address: Option<String>,
    pub documents: Vec<DocumentMetadata>,
}

/// Extra information attached to an event, selected by `xsi:type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventMetadata {
    EmailNotificationFailed {
        email_address: String,
        error_code: Option<String>,
    },
    SmsNotificationFailed {
        mobile_number: String,
        error_code: Option<String>,
    },
    PrintFailed {
        explanation: String,
    },
    Postmarked {
        postmark_date: DateTime<FixedOffset>,
    },
    MoveFilesFromPublicSector(MoveFilesFromPublicSector),
}

impl EventMetadata {
    pub const FAMILY: &'static str = "event-metadata";

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::EmailNotificationFailed { .. } => "email-notification-failed-metadata",
            Self::SmsNotificationFailed { .. } => "sms-notification-failed-metadata",
            Self::PrintFailed { .. } => "print-failed-metadata",
            Self::Postmarked { .. } => "postmarked-metadata",
            Self::MoveFilesFromPublicSector(_) => "move-files-from-public-sector-metadata",
        }
    }
}

impl XmlCodec for EventMetadata {
    fn to_xml(&self, name: &str) -> XmlElement {
        let element = XmlElement::new(name).attr(XSI_TYPE, &self.type_name().to_string());
        match self {
            Self::EmailNotificationFailed {
                email_address,
                error_code,
            } => element
                .attr("email-address", email_address)
                .opt_attr("error-code", error_code.as_ref()),
            Self::SmsNotificationFailed {
                mobile_number,
                error_code,
            } => element
                .attr("mobile-number", mobile_number)
                .opt_attr("error-code", error_code.as_ref()),
            Self::PrintFailed { explanation } => element.attr("explanation", explanation),
            Self::Postmarked { postmark_date } => element.attr("postmark-date", postmark_date),
            Self::MoveFilesFromPublicSector(moved) => element
                .opt_attr("opened", moved.opened.as_ref())
                .attr("delivery-time", &moved.delivery_time)
                .opt_attr("subject", moved.subject.as_ref())
                .opt_attr("sensitivity-level", moved.sensitivity_level.as_ref())
                .opt_attr("authentication-level", moved.authentication_level.as_ref())
                .opt_attr("certificate", moved.certificate.as_ref())
                .opt_attr("destination-mailbox", moved.destination_mailbox.as_ref())
                .opt_attr(
                    "destination-mailbox-address",
                    moved.destination_mailbox_address.as_ref(),
                )
                .records("document", &moved.documents),
        }
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let discriminator = element.attribute(XSI_TYPE).ok_or_else(|| {
            RepresentationError::schema(&element.name, XSI_TYPE, "missing type discriminator")
        })?;
        // Prefixed type names (ns:print-failed-metadata) select the same variant.
        let type_name = discriminator
            .rsplit_once(':')
            .map_or(discriminator, |(_, local)| local);

        let mut children = Children::new(element);
        let metadata = match type_name {
            "email-notification-failed-metadata" => Self::EmailNotificationFailed {
                email_address: element.required_attr("email-address")?,
                error_code: element.optional_attr("error-code")?,
            },
            "sms-notification-failed-metadata" => Self::SmsNotificationFailed {
                mobile_number: element.required_attr("mobile-number")?,
                error_code: element.optional_attr("error-code")?,
            },
            "print-failed-metadata" => Self::PrintFailed {
                explanation: element.required_attr("explanation")?,
            },
            "postmarked-metadata" => Self::Postmarked {
                postmark_date: element.required_attr("postmark-date")?,
            },
            "move-files-from-public-sector-metadata" => {
                Self::MoveFilesFromPublicSector(MoveFilesFromPublicSector {
                    opened: element.optional_attr("opened")?,
                    delivery_time: element.required_attr("delivery-time")?,
                    subject: element.optional_attr("subject")?,
                    sensitivity_level: element.optional_attr("sensitivity-level")?,
                    authentication_level: element.optional_attr("authentication-level")?,
                    certificate: element.optional_attr("certificate")?,
                    destination_mailbox: element.optional_attr("destination-mailbox")?,
                    destination_mailbox_address: element
                        .optional_attr("destination-mailbox-address")?,
                    documents: children.records("document")?,
                })
            }
            other => {
                return Err(RepresentationError::UnknownVariant {
                    family: Self::FAMILY,
                    discriminator: other.to_string(),
                })
            }
        };
        children.finish()?;
        Ok(metadata)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentEvent {
    pub uuid: Uuid,
    pub event_type: DocumentEventType,
    pub created: DateTime<FixedOffset>,
    pub document_created: Option<DateTime<FixedOffset>>,
    pub metadata: Option<EventMetadata>,
}

impl XmlCodec for DocumentEvent {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("uuid", &self.uuid)
            .attr("type", &self.event_type)
            .attr("created", &self.created)
            .opt_attr("document-created", self.document_created.as_ref())
            .opt_record("metadata", self.metadata.as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let event = Self {
            uuid: element.required_attr("uuid")?,
            event_type: element.required_attr("type")?,
            created: element.required_attr("created")?,
            document_created: element.optional_attr("document-created")?,
            metadata: children.opt_record("metadata")?,
        };
        children.finish()?;
        Ok(event)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentEvents {
    pub events: Vec<DocumentEvent>,
    pub links: Vec<Link>,
}

impl DocumentEvents {
    pub fn next_link(&self) -> Option<&Link> {
        self.link(&Relation::Next)
    }
}

impl Linked for DocumentEvents {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for DocumentEvents {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .records("event", &self.events)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let events = Self {
            events: children.records("event")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(events)
    }
}

impl RootElement for DocumentEvents {
    const ROOT: &'static str = "document-events";
}
