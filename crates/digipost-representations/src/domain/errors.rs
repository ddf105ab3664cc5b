//! # Representation Errors

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while building, encoding or decoding representations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepresentationError {
    /// The input is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// The document violates the schema: missing, misplaced or unexpected
    /// content, or a value of the wrong lexical form.
    #[error("Schema violation in <{element}> at {field}: {reason}")]
    SchemaValidation {
        element: String,
        field: String,
        reason: String,
    },

    /// A polymorphic discriminator or enum value is not recognised.
    #[error("Unknown {family} variant: {discriminator}")]
    UnknownVariant {
        family: &'static str,
        discriminator: String,
    },

    /// Two documents in one message share a UUID.
    #[error("Duplicate document UUID in message: {0}")]
    DuplicateDocumentUuid(Uuid),

    /// A message was built without any recipient.
    #[error("Message has no recipient")]
    MissingRecipient,

    /// No document with this UUID belongs to the message.
    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    /// A constructor argument is out of its domain.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl RepresentationError {
    pub fn schema(
        element: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SchemaValidation {
            element: element.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn xml(error: impl std::fmt::Display) -> Self {
        Self::Xml(error.to_string())
    }
}
