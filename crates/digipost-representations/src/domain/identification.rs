//! # Recipient Identification
//!
//! Ask whether a recipient can be reached in Digipost before sending.

use super::recipient::RecipientIdentification;
use crate::codec::{Children, RootElement, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identification {
    Recipient(RecipientIdentification),
    BankAccountNumber(String),
}

impl XmlCodec for Identification {
    fn to_xml(&self, name: &str) -> XmlElement {
        let identifier = match self {
            Self::Recipient(recipient) => recipient.to_element(),
            Self::BankAccountNumber(number) => XmlElement::new("bank-account-number").text(number),
        };
        XmlElement::new(name).child(identifier)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let first = children.next_any().ok_or_else(|| {
            RepresentationError::schema(&element.name, "identifier", "missing identifier")
        })?;
        let identification = if first.name == "bank-account-number" {
            Self::BankAccountNumber(first.value()?)
        } else {
            let recipient = RecipientIdentification::try_from_element(first).ok_or_else(|| {
                RepresentationError::UnknownVariant {
                    family: RecipientIdentification::FAMILY,
                    discriminator: first.name.clone(),
                }
            })??;
            Self::Recipient(recipient)
        };
        children.finish()?;
        Ok(identification)
    }
}

impl RootElement for Identification {
    const ROOT: &'static str = "identification";
}

xml_enum! {
    pub enum IdentificationResultCode in "identification-result-code" {
        Digipost => "DIGIPOST",
        Identified => "IDENTIFIED",
        Unidentified => "UNIDENTIFIED",
        Invalid => "INVALID",
    }
}

xml_enum! {
    pub enum InvalidReason in "invalid-reason" {
        InvalidPersonalIdentificationNumber => "INVALID_PERSONAL_IDENTIFICATION_NUMBER",
        InvalidOrganisationNumber => "INVALID_ORGANISATION_NUMBER",
        Unknown => "UNKNOWN",
    }
}

xml_enum! {
    pub enum UnidentifiedReason in "unidentified-reason" {
        NotFound => "NOT_FOUND",
        MultipleMatches => "MULTIPLE_MATCHES",
    }
}

/// Detail of an identification result, selected by element name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdentificationDetail {
    DigipostAddress(String),
    /// Opaque alias for a person who can only receive print.
    Personalias(String),
    InvalidReason(InvalidReason),
    UnidentifiedReason(UnidentifiedReason),
}

impl IdentificationDetail {
    pub const FAMILY: &'static str = "identification-detail";

    fn to_element(&self) -> XmlElement {
        match self {
            Self::DigipostAddress(address) => XmlElement::new("digipost-address").text(address),
            Self::Personalias(alias) => XmlElement::new("personalias").text(alias),
            Self::InvalidReason(reason) => XmlElement::new("invalid-reason").text(reason),
            Self::UnidentifiedReason(reason) => XmlElement::new("unidentified-reason").text(reason),
        }
    }

    fn from_element(element: &XmlElement) -> Result<Self, RepresentationError> {
        match element.name.as_str() {
            "digipost-address" => element.value().map(Self::DigipostAddress),
            "personalias" => element.value().map(Self::Personalias),
            "invalid-reason" => element.value().map(Self::InvalidReason),
            "unidentified-reason" => element.value().map(Self::UnidentifiedReason),
            other => Err(RepresentationError::UnknownVariant {
                family: Self::FAMILY,
                discriminator: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentificationResult {
    pub result: IdentificationResultCode,
    pub detail: Option<IdentificationDetail>,
}

impl XmlCodec for IdentificationResult {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .leaf("result", &self.result)
            .opt_child(self.detail.as_ref().map(IdentificationDetail::to_element))
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let result = children.leaf("result")?;
        let detail = children
            .next_any()
            .map(IdentificationDetail::from_element)
            .transpose()?;
        children.finish()?;
        Ok(Self { result, detail })
    }
}

impl RootElement for IdentificationResult {
    const ROOT: &'static str = "identification-result";
}
