//! Inbound port (driving side): the operations the client offers.

use crate::delivery::OngoingDelivery;
use crate::domain::errors::DigipostError;
use crate::domain::queries::{DocumentEventsQuery, InboxPage};
use async_trait::async_trait;
use bytes::Bytes;
use digipost_representations::{
    AdditionalData, Autocomplete, DocumentEvents, DocumentStatus, Identification,
    IdentificationResult, Inbox, InboxDocument, Link, Message, Recipients, SenderId,
    SenderInformation, UserAccount, UserInformation,
};
use uuid::Uuid;

/// The Digipost API as seen by a sending organisation.
///
/// Implemented by [`DigipostClient`](crate::DigipostClient) against the real
/// API and by [`MockDigipostClient`](crate::MockDigipostClient) in memory.
#[async_trait]
pub trait DigipostApi: Send + Sync {
    /// Create a message for digital delivery, printed by the server if the
    /// recipient is not a Digipost user and print details are given. The
    /// returned delivery is `Created`.
    async fn create_message(&self, message: Message) -> Result<OngoingDelivery, DigipostError>;

    /// Create a message that goes straight to print.
    async fn create_print_only_message(
        &self,
        message: Message,
    ) -> Result<OngoingDelivery, DigipostError>;

    async fn identify_recipient(
        &self,
        identification: &Identification,
    ) -> Result<IdentificationResult, DigipostError>;

    /// Attach structured data to a sent document through its `add-data` link.
    async fn add_data(&self, link: &Link, data: &AdditionalData) -> Result<(), DigipostError>;

    async fn search(&self, query: &str) -> Result<Recipients, DigipostError>;

    async fn autocomplete(&self, query: &str) -> Result<Autocomplete, DigipostError>;

    async fn document_events(
        &self,
        query: &DocumentEventsQuery,
    ) -> Result<DocumentEvents, DigipostError>;

    async fn sender_information(
        &self,
        sender_id: SenderId,
    ) -> Result<SenderInformation, DigipostError>;

    async fn sender_information_by_organisation(
        &self,
        organisation_number: &str,
        part_id: Option<&str>,
    ) -> Result<SenderInformation, DigipostError>;

    async fn document_status(&self, link: &Link) -> Result<DocumentStatus, DigipostError>;

    async fn document_status_by_uuid(
        &self,
        sender_id: SenderId,
        uuid: Uuid,
    ) -> Result<DocumentStatus, DigipostError>;

    /// Raw content at a path relative to the API root.
    async fn content(&self, path: &str) -> Result<Bytes, DigipostError>;

    async fn inbox(&self, sender_id: SenderId, page: InboxPage) -> Result<Inbox, DigipostError>;

    async fn inbox_document_content(
        &self,
        document: &InboxDocument,
    ) -> Result<Bytes, DigipostError>;

    async fn delete_inbox_document(&self, document: &InboxDocument) -> Result<(), DigipostError>;

    async fn create_or_activate_user_account(
        &self,
        sender_id: SenderId,
        user: &UserInformation,
    ) -> Result<UserAccount, DigipostError>;
}
