//! # Search & Autocomplete

use super::link::{Link, Linked};
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub house_letter: Option<String>,
    pub additional_addressline: Option<String>,
    pub zip_code: String,
    pub city: String,
}

impl XmlCodec for Address {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .opt_leaf("street", self.street.as_ref())
            .opt_leaf("house-number", self.house_number.as_ref())
            .opt_leaf("house-letter", self.house_letter.as_ref())
            .opt_leaf("additional-addressline", self.additional_addressline.as_ref())
            .leaf("zip-code", &self.zip_code)
            .leaf("city", &self.city)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let address = Self {
            street: children.opt_leaf("street")?,
            house_number: children.opt_leaf("house-number")?,
            house_letter: children.opt_leaf("house-letter")?,
            additional_addressline: children.opt_leaf("additional-addressline")?,
            zip_code: children.leaf("zip-code")?,
            city: children.leaf("city")?,
        };
        children.finish()?;
        Ok(address)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub firstname: String,
    pub middlename: Option<String>,
    pub lastname: String,
    pub digipost_address: String,
    pub mobile_number: Option<String>,
    pub organisation_name: Option<String>,
    pub addresses: Vec<Address>,
    pub links: Vec<Link>,
}

impl Linked for Recipient {
    fn links(&self) -> &[Link] {
        &self.links
    }
}

impl XmlCodec for Recipient {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("firstname", &self.firstname)
            .opt_leaf("middlename", self.middlename.as_ref())
            .leaf("lastname", &self.lastname)
            .leaf("digipost-address", &self.digipost_address)
            .opt_leaf("mobile-number", self.mobile_number.as_ref())
            .opt_leaf("organisation-name", self.organisation_name.as_ref())
            .records("address", &self.addresses)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let recipient = Self {
            firstname: children.leaf("firstname")?,
            middlename: children.opt_leaf("middlename")?,
            lastname: children.leaf("lastname")?,
            digipost_address: children.leaf("digipost-address")?,
            mobile_number: children.opt_leaf("mobile-number")?,
            organisation_name: children.opt_leaf("organisation-name")?,
            addresses: children.records("address")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(recipient)
    }
}

/// Search result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Recipients {
    pub recipients: Vec<Recipient>,
    pub links: Vec<Link>,
}

impl XmlCodec for Recipients {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .records("recipient", &self.recipients)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let recipients = Self {
            recipients: children.records("recipient")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(recipients)
    }
}

impl RootElement for Recipients {
    const ROOT: &'static str = "recipients";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suggestion {
    pub search_string: String,
    pub links: Vec<Link>,
}

impl XmlCodec for Suggestion {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("search-string", &self.search_string)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let suggestion = Self {
            search_string: children.leaf("search-string")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(suggestion)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Autocomplete {
    pub suggestions: Vec<Suggestion>,
    pub links: Vec<Link>,
}

impl XmlCodec for Autocomplete {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .records("suggestion", &self.suggestions)
            .records("link", &self.links)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let autocomplete = Self {
            suggestions: children.records("suggestion")?,
            links: children.records("link")?,
        };
        children.finish()?;
        Ok(autocomplete)
    }
}

impl RootElement for Autocomplete {
    const ROOT: &'static str = "autocomplete";
}
