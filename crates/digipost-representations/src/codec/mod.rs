//! # Representation Codec
//!
//! Serialises representations to the Digipost v7 XML schema and validates
//! documents against it while reading.
//!
//! Each type implements [`XmlCodec`] for its own content model. Types that can
//! be the body of a request or response also implement [`RootElement`] and go
//! through [`serialize`] / [`deserialize`], which add and check the namespace.

pub mod cursor;
pub mod tree;
pub mod values;

pub use cursor::Children;
pub use tree::XmlElement;
pub use values::XmlValue;

use crate::domain::errors::RepresentationError;

/// Namespace of every Digipost v7 representation.
pub const NAMESPACE: &str = "http://api.digipost.no/schema/v7";

/// Media type negotiated in `Accept` and `Content-Type`.
pub const MEDIA_TYPE: &str = "application/vnd.digipost-v7+xml";

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Attribute that selects the concrete type of a polymorphic element.
pub const XSI_TYPE: &str = "xsi:type";

/// Bidirectional mapping between a type and its element content.
pub trait XmlCodec: Sized {
    /// Encode as an element named `name`.
    fn to_xml(&self, name: &str) -> XmlElement;

    fn from_xml(element: &XmlElement) -> Result<Self, RepresentationError>;
}

/// A representation that is exchanged as a whole document.
pub trait RootElement: XmlCodec {
    const ROOT: &'static str;
}

pub fn serialize<T: RootElement>(value: &T) -> Result<Vec<u8>, RepresentationError> {
    tree::write(&value.to_xml(T::ROOT))
}

pub fn deserialize<T: RootElement>(bytes: &[u8]) -> Result<T, RepresentationError> {
    let root = tree::parse(bytes)?;
    if root.namespace.as_deref() != Some(NAMESPACE) {
        return Err(RepresentationError::schema(
            &root.name,
            "xmlns",
            format!(
                "expected namespace {NAMESPACE}, found {}",
                root.namespace.as_deref().unwrap_or("none")
            ),
        ));
    }
    root.expect_name(T::ROOT)?;
    T::from_xml(&root)
}
