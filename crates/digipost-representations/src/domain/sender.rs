//! # Sender Information, Additional Data & User Accounts

use super::link::{Link, Linked, Relation};
use super::message::SenderId;
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;

xml_enum! {
    pub enum SenderStatus in "sender-status" {
        ValidSender => "VALID_SENDER",
        NoInfoAvailable => "NO_INFO_AVAILABLE",
        DummySenderForTest => "DUMMY_SENDER_FOR_TEST",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderInformation {
    pub sender_id: Option<SenderId>,
    pub status: SenderStatus,
    pub supported_features: Vec<String>,
    pub links: Vec<Link>,
}

impl SenderInformation {
    pub fn is_valid_sender(&self) -> bool {
        self.status == SenderStatus::ValidSender
    }

    pub fn supports(&self, feature: &str) -> bool {
        self.supported_features.iter().any(|f| f == feature)
    }

    pub fn document_status_link(&self) -> Option<&Link> {
        self.link(&Relation::DocumentStatus)
    }

    pub fn inbox_link(&self) -> Option<&Link> {
        self.link(&Relation::GetInbox)
    }
}

impl Linked for SenderInformation {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for SenderInformation {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .opt_leaf("sender-id", self.sender_id.map(|id| id.0).as_ref())
            .leaf("status", &self.status)
            .leaves("supported-feature", &self.supported_features)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let information = Self {
            sender_id: children.opt_leaf::<u64>("sender-id")?.map(SenderId),
            status: children.leaf("status")?,
            supported_features: children.leaves("supported-feature")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(information)
    }
}

impl RootElement for SenderInformation {
    const ROOT: &'static str = "sender-information";
}

/// Structured data attached to an already sent document, e.g. an
/// appointment. The payload element is carried as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdditionalData {
    pub data: XmlElement,
    pub sender_id: Option<SenderId>,
}

impl XmlCodec for AdditionalData {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .child(XmlElement::new("data").child(self.data.clone()))
            .opt_leaf("sender-id", self.sender_id.map(|id| id.0).as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let wrapper = children.required("data")?;
        let mut payload = Children::new(wrapper);
        let data = payload
            .next_open()
            .ok_or_else(|| RepresentationError::schema("data", "payload", "missing payload"))?;
        payload.finish()?;
        let sender_id = children.opt_leaf::<u64>("sender-id")?.map(SenderId);
        children.finish()?;

        let mut data = data.clone();
        strip_namespaces(&mut data);
        Ok(Self { data, sender_id })
    }
}

fn strip_namespaces(element: &mut XmlElement) {
    element.namespace = None;
    element.children.iter_mut().for_each(strip_namespaces);
}

impl RootElement for AdditionalData {
    const ROOT: &'static str = "additional-data";
}

/// Person to create or activate a Digipost account for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserInformation {
    pub personal_identification_number: String,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
}

impl XmlCodec for UserInformation {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("personal-identification-number", &self.personal_identification_number)
            .opt_leaf("email-address", self.email_address.as_ref())
            .opt_leaf("phone-number", self.phone_number.as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let user = Self {
            personal_identification_number: children.leaf("personal-identification-number")?,
            email_address: children.opt_leaf("email-address")?,
            phone_number: children.opt_leaf("phone-number")?,
        };
        children.finish()?;
        Ok(user)
    }
}

impl RootElement for UserInformation {
    const ROOT: &'static str = "user-information";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAccount {
    pub digipost_address: String,
    pub links: Vec<Link>,
}

impl Linked for UserAccount {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for UserAccount {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("digipost-address", &self.digipost_address)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let account = Self {
            digipost_address: children.leaf("digipost-address")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(account)
    }
}

impl RootElement for UserAccount {
    const ROOT: &'static str = "user-account";
}
