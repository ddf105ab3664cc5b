//! # Message
//!
//! The unit of delivery: one primary document, ordered attachments and a
//! recipient. Built once through [`MessageBuilder`] and immutable after that.

use super::document::{AuthenticationLevel, Document, SensitivityLevel};
use super::print::PrintDetails;
use super::recipient::{MessageRecipient, NameAndAddress, RecipientIdentification};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Numeric id of a sending organisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SenderId(pub u64);

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sender addressed by organisation number and optional part (department).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderOrganization {
    pub organization_id: String,
    pub part_id: Option<String>,
}

impl XmlCodec for SenderOrganization {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("organization-id", &self.organization_id)
            .opt_leaf("part-id", self.part_id.as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let organization = Self {
            organization_id: children.leaf("organization-id")?,
            part_id: children.opt_leaf("part-id")?,
        };
        children.finish()?;
        Ok(organization)
    }
}

/// Sender on whose behalf a broker sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageSender {
    Id(SenderId),
    Organization(SenderOrganization),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    message_id: String,
    sender: Option<MessageSender>,
    recipient: MessageRecipient,
    delivery_time: Option<DateTime<FixedOffset>>,
    invoice_reference: Option<String>,
    primary_document: Document,
    attachments: Vec<Document>,
}

impl Message {
    pub fn builder(message_id: impl Into<String>, primary_document: Document) -> MessageBuilder {
        MessageBuilder {
            message_id: message_id.into(),
            sender: None,
            identification: None,
            print_details: None,
            delivery_time: None,
            invoice_reference: None,
            primary_document,
            attachments: Vec::new(),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    pub fn sender(&self) -> Option<&MessageSender> {
        self.sender.as_ref()
    }

    pub fn recipient(&self) -> &MessageRecipient {
        &self.recipient
    }

    pub fn delivery_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.delivery_time.as_ref()
    }

    pub fn invoice_reference(&self) -> Option<&str> {
        self.invoice_reference.as_deref()
    }

    pub fn primary_document(&self) -> &Document {
        &self.primary_document
    }

    pub fn attachments(&self) -> &[Document] {
        &self.attachments
    }

    /// Primary document first, then attachments in order.
    pub fn all_documents(&self) -> impl Iterator<Item = &Document> {
        std::iter::once(&self.primary_document).chain(self.attachments.iter())
    }

    pub fn document_by_uuid(&self, uuid: &Uuid) -> Result<&Document, RepresentationError> {
        self.all_documents()
            .find(|d| &d.uuid == uuid)
            .ok_or(RepresentationError::DocumentNotFound(*uuid))
    }

    pub fn is_direct_print(&self) -> bool {
        self.recipient.is_direct_print()
    }

    pub fn authentication_level(&self) -> AuthenticationLevel {
        self.primary_document.authentication_level
    }

    pub fn sensitivity_level(&self) -> SensitivityLevel {
        self.primary_document.sensitivity_level
    }
}

fn ensure_unique_uuids<'a>(
    documents: impl Iterator<Item = &'a Document>,
) -> Result<(), RepresentationError> {
    let mut seen = HashSet::new();
    for document in documents {
        if !seen.insert(document.uuid) {
            return Err(RepresentationError::DuplicateDocumentUuid(document.uuid));
        }
    }
    Ok(())
}

impl XmlCodec for Message {
    fn to_xml(&self, name: &str) -> XmlElement {
        let element = XmlElement::new(name).leaf("message-id", &self.message_id);
        let element = match &self.sender {
            Some(MessageSender::Id(id)) => element.leaf("sender-id", &id.0),
            Some(MessageSender::Organization(org)) => element.record("sender-organization", org),
            None => element,
        };
        element
            .record("recipient", &self.recipient)
            .opt_leaf("delivery-time", self.delivery_time.as_ref())
            .opt_leaf("invoice-reference", self.invoice_reference.as_ref())
            .record("primary-document", &self.primary_document)
            .records("attachment", &self.attachments)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let message_id = children.leaf("message-id")?;
        let sender = match children.opt_leaf::<u64>("sender-id")? {
            Some(id) => Some(MessageSender::Id(SenderId(id))),
            None => children
                .opt_record("sender-organization")?
                .map(MessageSender::Organization),
        };
        let message = Self {
            message_id,
            sender,
            recipient: children.record("recipient")?,
            delivery_time: children.opt_leaf("delivery-time")?,
            invoice_reference: children.opt_leaf("invoice-reference")?,
            primary_document: children.record("primary-document")?,
            attachments: children.records("attachment")?,
        };
        children.finish()?;
        ensure_unique_uuids(message.all_documents())?;
        Ok(message)
    }
}

impl RootElement for Message {
    const ROOT: &'static str = "message";
}

// =============================================================================
// BUILDER
// =============================================================================

#[derive(Clone, Debug)]
pub struct MessageBuilder {
    message_id: String,
    sender: Option<MessageSender>,
    identification: Option<RecipientIdentification>,
    print_details: Option<PrintDetails>,
    delivery_time: Option<DateTime<FixedOffset>>,
    invoice_reference: Option<String>,
    primary_document: Document,
    attachments: Vec<Document>,
}

impl MessageBuilder {
    pub fn sender_id(mut self, id: SenderId) -> Self {
        self.sender = Some(MessageSender::Id(id));
        self
    }

    pub fn sender_organization(
        mut self,
        organization_id: impl Into<String>,
        part_id: Option<String>,
    ) -> Self {
        self.sender = Some(MessageSender::Organization(SenderOrganization {
            organization_id: organization_id.into(),
            part_id,
        }));
        self
    }

    pub fn recipient(mut self, recipient: MessageRecipient) -> Self {
        match recipient {
            MessageRecipient::Digital {
                identification,
                print_fallback,
            } => {
                self.identification = Some(identification);
                self.print_details = print_fallback;
            }
            MessageRecipient::PrintOnly(details) => {
                self.identification = None;
                self.print_details = Some(details);
            }
        }
        self
    }

    pub fn identification(mut self, identification: RecipientIdentification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn personal_identification_number(self, number: impl Into<String>) -> Self {
        self.identification(RecipientIdentification::PersonalIdentificationNumber(
            number.into(),
        ))
    }

    pub fn digipost_address(self, address: impl Into<String>) -> Self {
        self.identification(RecipientIdentification::DigipostAddress(address.into()))
    }

    pub fn name_and_address(self, value: NameAndAddress) -> Self {
        self.identification(RecipientIdentification::NameAndAddress(value))
    }

    pub fn organisation_number(self, number: impl Into<String>) -> Self {
        self.identification(RecipientIdentification::OrganisationNumber(number.into()))
    }

    /// Print fallback when an identification is set, print-only otherwise.
    pub fn print_details(mut self, details: PrintDetails) -> Self {
        self.print_details = Some(details);
        self
    }

    pub fn delivery_time(mut self, at: DateTime<FixedOffset>) -> Self {
        self.delivery_time = Some(at);
        self
    }

    pub fn invoice_reference(mut self, reference: impl Into<String>) -> Self {
        self.invoice_reference = Some(reference.into());
        self
    }

    pub fn attachment(mut self, document: Document) -> Self {
        self.attachments.push(document);
        self
    }

    pub fn attachments(mut self, documents: impl IntoIterator<Item = Document>) -> Self {
        self.attachments.extend(documents);
        self
    }

    pub fn build(self) -> Result<Message, RepresentationError> {
        let recipient = match (self.identification, self.print_details) {
            (Some(identification), print_fallback) => MessageRecipient::Digital {
                identification,
                print_fallback,
            },
            (None, Some(details)) => MessageRecipient::PrintOnly(details),
            (None, None) => return Err(RepresentationError::MissingRecipient),
        };
        let message = Message {
            message_id: self.message_id,
            sender: self.sender,
            recipient,
            delivery_time: self.delivery_time,
            invoice_reference: self.invoice_reference,
            primary_document: self.primary_document,
            attachments: self.attachments,
        };
        ensure_unique_uuids(message.all_documents())?;
        Ok(message)
    }
}
