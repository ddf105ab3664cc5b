//! # Entry Point & Error Message
//!
//! The entry point is the root of the hypermedia API: the server certificate
//! and links to every top-level operation. Error messages accompany every
//! non-2xx response.

use super::link::{Link, Linked, Relation};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPoint {
    /// PEM-encoded server certificate.
    pub certificate: String,
    pub links: Vec<Link>,
}

impl EntryPoint {
    pub fn create_message_link(&self) -> Option<&Link> {
        self.link(&Relation::CreateMessage)
    }
}

impl Linked for EntryPoint {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for EntryPoint {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("certificate", &self.certificate)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let entry_point = Self {
            certificate: children.leaf("certificate")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(entry_point)
    }
}

impl RootElement for EntryPoint {
    const ROOT: &'static str = "entrypoint";
}

xml_enum! {
    /// Who is at fault for a rejected request.
    pub enum ErrorType in "error-type" {
        ClientData => "CLIENT_DATA",
        ClientTechnical => "CLIENT_TECHNICAL",
        Configuration => "CONFIGURATION",
        Server => "SERVER",
        None => "NONE",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error_code: Option<String>,
    pub error_message: String,
    pub error_type: ErrorType,
    pub links: Vec<Link>,
}

impl ErrorMessage {
    pub fn new(error_type: ErrorType, error_message: impl Into<String>) -> Self {
        Self {
            error_code: None,
            error_message: error_message.into(),
            error_type,
            links: Vec::new(),
        }
    }
}

impl Linked for ErrorMessage {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for ErrorMessage {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .opt_leaf("error-code", self.error_code.as_ref())
            .leaf("error-message", &self.error_message)
            .leaf("error-type", &self.error_type)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let error = Self {
            error_code: children.opt_leaf("error-code")?,
            error_message: children.leaf("error-message")?,
            error_type: children.leaf("error-type")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(error)
    }
}

impl RootElement for ErrorMessage {
    const ROOT: &'static str = "error";
}
