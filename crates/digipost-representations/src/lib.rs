//! # Digipost Representations
//!
//! The request and response bodies of the Digipost API and their XML form.
//!
//! ## Architecture
//!
//! - **Codec** (`codec/`): element tree over quick-xml, sequence cursor,
//!   leaf value forms, [`serialize`] / [`deserialize`]
//! - **Domain** (`domain/`): messages, documents, deliveries, events, inbox,
//!   identification and the other server representations
//!
//! ## Invariants
//!
//! - `deserialize(serialize(x)) == x` for every representation
//! - Documents of one message have distinct UUIDs
//! - Polymorphic families are closed; unknown discriminators are errors

#[macro_use]
mod macros;

pub mod codec;
pub mod domain;

#[cfg(test)]
mod proptests;

// Re-export public API
pub use codec::{deserialize, serialize, RootElement, XmlCodec, XmlElement, MEDIA_TYPE, NAMESPACE};
pub use domain::delivery::{Channel, MessageDelivery, MessageStatus};
pub use domain::document::{
    AuthenticationLevel, Document, EmailNotification, FileType, Invoice, SensitivityLevel,
    SmsNotification,
};
pub use domain::entry_point::{EntryPoint, ErrorMessage, ErrorType};
pub use domain::errors::RepresentationError;
pub use domain::events::{
    DocumentEvent, DocumentEventType, DocumentEvents, DocumentMetadata, EventMetadata,
    MoveFilesFromPublicSector,
};
pub use domain::identification::{
    Identification, IdentificationDetail, IdentificationResult, IdentificationResultCode,
    InvalidReason, UnidentifiedReason,
};
pub use domain::inbox::{Inbox, InboxDocument};
pub use domain::link::{Link, Linked, Relation};
pub use domain::message::{
    Message, MessageBuilder, MessageSender, SenderId, SenderOrganization,
};
pub use domain::print::{
    ForeignAddress, ForeignCountry, NondeliverableHandling, NorwegianAddress, PostType,
    PrintAddress, PrintColors, PrintDetails, PrintInstruction, PrintRecipient,
};
pub use domain::recipient::{MessageRecipient, NameAndAddress, RecipientIdentification};
pub use domain::search::{Address, Autocomplete, Recipient, Recipients, Suggestion};
pub use domain::sender::{
    AdditionalData, SenderInformation, SenderStatus, UserAccount, UserInformation,
};
pub use domain::status::{DeliveryStatus, DocumentStatus, HashAlgorithm, Read};
