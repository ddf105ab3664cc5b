//! # Print Details
//!
//! Physical mail: who receives the printed letter, where undeliverable mail
//! is returned, and how it is printed.

use crate::codec::{Children, XmlCodec, XmlElement};
use crate::domain::errors::RepresentationError;

xml_enum! {
    pub enum PostType in "post-type" {
        A => "A",
        B => "B",
    }
}

xml_enum! {
    pub enum PrintColors in "print-colors" {
        Monochrome => "MONOCHROME",
        Colors => "COLORS",
    }
}

xml_enum! {
    pub enum NondeliverableHandling in "nondeliverable-handling" {
        Shred => "SHRED",
        ReturnToSender => "RETURN_TO_SENDER",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NorwegianAddress {
    pub addressline1: Option<String>,
    pub addressline2: Option<String>,
    pub addressline3: Option<String>,
    pub zip_code: String,
    pub city: String,
}

impl NorwegianAddress {
    pub fn new(zip_code: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            addressline1: None,
            addressline2: None,
            addressline3: None,
            zip_code: zip_code.into(),
            city: city.into(),
        }
    }

    pub fn with_addressline(mut self, line: impl Into<String>) -> Self {
        let line = Some(line.into());
        if self.addressline1.is_none() {
            self.addressline1 = line;
        } else if self.addressline2.is_none() {
            self.addressline2 = line;
        } else {
            self.addressline3 = line;
        }
        self
    }
}

impl XmlCodec for NorwegianAddress {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .opt_leaf("addressline1", self.addressline1.as_ref())
            .opt_leaf("addressline2", self.addressline2.as_ref())
            .opt_leaf("addressline3", self.addressline3.as_ref())
            .leaf("zip-code", &self.zip_code)
            .leaf("city", &self.city)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let address = Self {
            addressline1: children.opt_leaf("addressline1")?,
            addressline2: children.opt_leaf("addressline2")?,
            addressline3: children.opt_leaf("addressline3")?,
            zip_code: children.leaf("zip-code")?,
            city: children.leaf("city")?,
        };
        children.finish()?;
        Ok(address)
    }
}

/// Destination country, by name or by ISO 3166-1 alpha-2 code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForeignCountry {
    Name(String),
    Code(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignAddress {
    pub addressline1: String,
    pub addressline2: Option<String>,
    pub addressline3: Option<String>,
    pub addressline4: Option<String>,
    pub country: ForeignCountry,
}

impl ForeignAddress {
    pub fn new(addressline1: impl Into<String>, country: ForeignCountry) -> Self {
        Self {
            addressline1: addressline1.into(),
            addressline2: None,
            addressline3: None,
            addressline4: None,
            country,
        }
    }
}

impl XmlCodec for ForeignAddress {
    fn to_xml(&self, name: &str) -> XmlElement {
        let element = XmlElement::new(name)
            .leaf("addressline1", &self.addressline1)
            .opt_leaf("addressline2", self.addressline2.as_ref())
            .opt_leaf("addressline3", self.addressline3.as_ref())
            .opt_leaf("addressline4", self.addressline4.as_ref());
        match &self.country {
            ForeignCountry::Name(country) => element.leaf("country", country),
            ForeignCountry::Code(code) => element.leaf("country-code", code),
        }
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let addressline1 = children.leaf("addressline1")?;
        let addressline2 = children.opt_leaf("addressline2")?;
        let addressline3 = children.opt_leaf("addressline3")?;
        let addressline4 = children.opt_leaf("addressline4")?;
        let country = match children.next_any() {
            Some(c) if c.name == "country" => ForeignCountry::Name(c.value()?),
            Some(c) if c.name == "country-code" => ForeignCountry::Code(c.value()?),
            Some(other) => {
                return Err(RepresentationError::UnknownVariant {
                    family: "foreign-country",
                    discriminator: other.name.clone(),
                })
            }
            None => {
                return Err(RepresentationError::schema(
                    &element.name,
                    "country",
                    "missing country or country-code",
                ))
            }
        };
        children.finish()?;
        Ok(Self {
            addressline1,
            addressline2,
            addressline3,
            addressline4,
            country,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintAddress {
    Norwegian(NorwegianAddress),
    Foreign(ForeignAddress),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintRecipient {
    pub name: String,
    pub address: PrintAddress,
}

impl PrintRecipient {
    pub fn new(name: impl Into<String>, address: PrintAddress) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl XmlCodec for PrintRecipient {
    fn to_xml(&self, name: &str) -> XmlElement {
        let element = XmlElement::new(name).leaf("name", &self.name);
        match &self.address {
            PrintAddress::Norwegian(address) => element.record("norwegian-address", address),
            PrintAddress::Foreign(address) => element.record("foreign-address", address),
        }
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let name = children.leaf("name")?;
        let address = match children.next_any() {
            Some(a) if a.name == "norwegian-address" => {
                PrintAddress::Norwegian(NorwegianAddress::from_xml(a)?)
            }
            Some(a) if a.name == "foreign-address" => {
                PrintAddress::Foreign(ForeignAddress::from_xml(a)?)
            }
            Some(other) => {
                return Err(RepresentationError::UnknownVariant {
                    family: "print-address",
                    discriminator: other.name.clone(),
                })
            }
            None => {
                return Err(RepresentationError::schema(
                    &element.name,
                    "address",
                    "missing address",
                ))
            }
        };
        children.finish()?;
        Ok(Self { name, address })
    }
}

/// Free-form key/value passed to the printing provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintInstruction {
    pub key: String,
    pub value: String,
}

impl XmlCodec for PrintInstruction {
    fn to_xml(&self, name: &str) -> XmlElement {
        XmlElement::new(name)
            .attr("key", &self.key)
            .attr("value", &self.value)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        Children::new(element).finish()?;
        Ok(Self {
            key: element.required_attr("key")?,
            value: element.required_attr("value")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintDetails {
    pub recipient: PrintRecipient,
    pub return_address: PrintRecipient,
    pub post_type: PostType,
    pub color: PrintColors,
    pub nondeliverable_handling: NondeliverableHandling,
    pub print_instructions: Vec<PrintInstruction>,
}

impl PrintDetails {
    /// B-post, monochrome, returned to sender when undeliverable.
    pub fn new(recipient: PrintRecipient, return_address: PrintRecipient) -> Self {
        Self {
            recipient,
            return_address,
            post_type: PostType::B,
            color: PrintColors::Monochrome,
            nondeliverable_handling: NondeliverableHandling::ReturnToSender,
            print_instructions: Vec::new(),
        }
    }

    pub fn with_post_type(mut self, post_type: PostType) -> Self {
        self.post_type = post_type;
        self
    }

    pub fn with_color(mut self, color: PrintColors) -> Self {
        self.color = color;
        self
    }

    pub fn with_nondeliverable_handling(mut self, handling: NondeliverableHandling) -> Self {
        self.nondeliverable_handling = handling;
        self
    }

    pub fn with_print_instruction(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.print_instructions.push(PrintInstruction {
            key: key.into(),
            value: value.into(),
        });
        self
    }
}

impl XmlCodec for PrintDetails {
    fn to_xml(&self, name: &str) -> XmlElement {
        let instructions = (!self.print_instructions.is_empty()).then(|| {
            XmlElement::new("print-instructions")
                .records("print-instruction", &self.print_instructions)
        });
        XmlElement::new(name)
            .record("recipient", &self.recipient)
            .record("return-address", &self.return_address)
            .leaf("post-type", &self.post_type)
            .leaf("color", &self.color)
            .leaf("nondeliverable-handling", &self.nondeliverable_handling)
            .opt_child(instructions)
    }

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError> {
        let mut children = Children::new(element);
        let recipient = children.record("recipient")?;
        let return_address = children.record("return-address")?;
        let post_type = children.leaf("post-type")?;
        let color = children.leaf("color")?;
        let nondeliverable_handling = children.leaf("nondeliverable-handling")?;
        let print_instructions = match children.optional("print-instructions") {
            Some(list) => {
                let mut items = Children::new(list);
                let instructions = items.records("print-instruction")?;
                items.finish()?;
                instructions
            }
            None => Vec::new(),
        };
        children.finish()?;
        Ok(Self {
            recipient,
            return_address,
            post_type,
            color,
            nondeliverable_handling,
            print_instructions,
        })
    }
}
