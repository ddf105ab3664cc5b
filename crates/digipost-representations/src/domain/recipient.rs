//! # Recipients
//!
//! How a message is addressed: a digital identification with optional print
//! fallback, or print only.

use super::print::PrintDetails;
use crate::codec::{Children, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;
use chrono::NaiveDate;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameAndAddress {
    pub fullname: String,
    pub addressline1: String,
    pub addressline2: Option<String>,
    pub postalcode: String,
    pub city: String,
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
}

impl NameAndAddress {
    pub fn new(
        fullname: impl Into<String>,
        addressline1: impl Into<String>,
        postalcode: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            fullname: fullname.into(),
            addressline1: addressline1.into(),
            addressline2: None,
            postalcode: postalcode.into(),
            city: city.into(),
            birth_date: None,
            phone_number: None,
            email_address: None,
        }
    }
}

impl XmlCodec for NameAndAddress {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("fullname", &self.fullname)
            .leaf("addressline1", &self.addressline1)
            .opt_leaf("addressline2", self.addressline2.as_ref())
            .leaf("postalcode", &self.postalcode)
            .leaf("city", &self.city)
            .opt_leaf("birth-date", self.birth_date.as_ref())
            .opt_leaf("phone-number", self.phone_number.as_ref())
            .opt_leaf("email-address", self.email_address.as_ref())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let value = Self {
            fullname: children.leaf("fullname")?,
            addressline1: children.leaf("addressline1")?,
            addressline2: children.opt_leaf("addressline2")?,
            postalcode: children.leaf("postalcode")?,
            city: children.leaf("city")?,
            birth_date: children.opt_leaf("birth-date")?,
            phone_number: children.opt_leaf("phone-number")?,
            email_address: children.opt_leaf("email-address")?,
        };
        children.finish()?;
        Ok(value)
    }
}

/// Identifies a Digipost recipient. The element name is the discriminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecipientIdentification {
    PersonalIdentificationNumber(String),
    DigipostAddress(String),
    NameAndAddress(NameAndAddress),
    OrganisationNumber(String),
}

impl RecipientIdentification {
    pub const FAMILY: &'static str = "recipient-identification";

    pub fn element_name(&self) -> &'static str {
        match self {
            Self::PersonalIdentificationNumber(_) => "personal-identification-number",
            Self::DigipostAddress(_) => "digipost-address",
            Self::NameAndAddress(_) => "name-and-address",
            Self::OrganisationNumber(_) => "organisation-number",
        }
    }

    pub fn is_personal_identification_number(&self) -> bool {
        matches!(self, Self::PersonalIdentificationNumber(_))
    }

    pub fn to_element(&self) -> XmlElement {
        let name = self.element_name();
        match self {
            Self::PersonalIdentificationNumber(value)
            | Self::DigipostAddress(value)
            | Self::OrganisationNumber(value) => XmlElement::new(name).text(value),
            Self::NameAndAddress(value) => value.to_xml(name),
        }
    }

    /// `None` when the element is not one of the identification variants.
    pub fn try_from_element(element: &XmlElement) -> Option<Result<Self, RepresentationError>> {
        let decoded = match element.name.as_str() {
            "personal-identification-number" => element.value().map(Self::PersonalIdentificationNumber),
            "digipost-address" => element.value().map(Self::DigipostAddress),
            "organisation-number" => element.value().map(Self::OrganisationNumber),
            "name-and-address" => NameAndAddress::from_xml(element).map(Self::NameAndAddress),
            _ => return None,
        };
        Some(decoded)
    }
}

/// Recipient of a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageRecipient {
    /// Delivered in Digipost, printed if the recipient has no mailbox and
    /// print details are given.
    Digital {
        identification: RecipientIdentification,
        print_fallback: Option<PrintDetails>,
    },
    /// Always printed.
    PrintOnly(PrintDetails),
}

impl MessageRecipient {
    pub fn digital(identification: RecipientIdentification) -> Self {
        Self::Digital {
            identification,
            print_fallback: None,
        }
    }

    pub fn identification(&self) -> Option<&RecipientIdentification> {
        match self {
            Self::Digital { identification, .. } => Some(identification),
            Self::PrintOnly(_) => None,
        }
    }

    pub fn print_details(&self) -> Option<&PrintDetails> {
        match self {
            Self::Digital { print_fallback, .. } => print_fallback.as_ref(),
            Self::PrintOnly(details) => Some(details),
        }
    }

    pub fn is_direct_print(&self) -> bool {
        matches!(self, Self::PrintOnly(_))
    }
}

impl XmlCodec for MessageRecipient {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .opt_child(self.identification().map(RecipientIdentification::to_element))
            .opt_record("print-details", self.print_details())
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let identification = match children.peek() {
            Some(first) if first.name != "print-details" => {
                let decoded = RecipientIdentification::try_from_element(first).ok_or_else(|| {
                    RepresentationError::UnknownVariant {
                        family: RecipientIdentification::FAMILY,
                        discriminator: first.name.clone(),
                    }
                })??;
                children.next_any();
                Some(decoded)
            }
            _ => None,
        };
        let print_details = children.opt_record("print-details")?;
        children.finish()?;

        match (identification, print_details) {
            (Some(identification), print_fallback) => Ok(Self::Digital {
                identification,
                print_fallback,
            }),
            (None, Some(details)) => Ok(Self::PrintOnly(details)),
            (None, None) => Err(RepresentationError::schema(
                &element.name,
                "identification",
                "recipient needs an identification or print details",
            )),
        }
    }
}
