//! # Digipost Client
//!
//! The facade over [`ApiService`]. Operation URIs come from the entry point;
//! sender-scoped resources live under the API root.

use crate::adapters::reqwest_transport::ReqwestTransport;
use crate::delivery::{DeliveryKind, OngoingDelivery};
use crate::domain::config::ClientConfig;
use crate::domain::errors::{DigipostError, TransportError};
use crate::domain::queries::{DocumentEventsQuery, InboxPage};
use crate::ports::inbound::DigipostApi;
use crate::ports::outbound::Transport;
use crate::service::{with_segments, ApiService};
use async_trait::async_trait;
use bytes::Bytes;
use digipost_representations::{
    AdditionalData, Autocomplete, DocumentEvents, DocumentStatus, Identification,
    IdentificationResult, Inbox, InboxDocument, Link, Message, Recipients, Relation, SenderId,
    SenderInformation, UserAccount, UserInformation,
};
use digipost_security::{RsaSha256Signer, Signer};
use std::path::Path;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct DigipostClient {
    service: Arc<ApiService>,
}

impl DigipostClient {
    /// Client over HTTPS with the transport timeouts of `config`.
    pub fn new(config: ClientConfig, signer: Arc<dyn Signer>) -> Result<Self, DigipostError> {
        let transport = ReqwestTransport::new(&config)?;
        Self::with_transport(config, signer, Arc::new(transport))
    }

    pub fn with_transport(
        config: ClientConfig,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, DigipostError> {
        Ok(Self::from_service(ApiService::new(config, signer, transport)?))
    }

    /// Load the broker key from a PKCS#12 or PEM file, then build as [`DigipostClient::new`].
    pub fn from_key_file(
        config: ClientConfig,
        key_path: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> Result<Self, DigipostError> {
        let signer = RsaSha256Signer::load(key_path, passphrase)?;
        Self::new(config, Arc::new(signer))
    }

    pub fn from_service(service: ApiService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<ApiService> {
        &self.service
    }

    async fn start(
        &self,
        kind: DeliveryKind,
        message: Message,
    ) -> Result<OngoingDelivery, DigipostError> {
        let message_id = message.message_id().to_string();
        let mut delivery = OngoingDelivery::new(kind, message, self.service.clone())?;
        delivery.create().await?;
        tracing::info!(message_id = %message_id, kind = ?kind, "Delivery created");
        Ok(delivery)
    }

    fn sender_resource(&self, sender_id: SenderId, segments: &[&str]) -> Result<Url, DigipostError> {
        let sender = sender_id.0.to_string();
        let mut path = vec![sender.as_str()];
        path.extend_from_slice(segments);
        with_segments(self.service.api_root(), &path)
    }
}

#[async_trait]
impl DigipostApi for DigipostClient {
    async fn create_message(&self, message: Message) -> Result<OngoingDelivery, DigipostError> {
        self.start(DeliveryKind::WithPrintFallback, message).await
    }

    async fn create_print_only_message(
        &self,
        message: Message,
    ) -> Result<OngoingDelivery, DigipostError> {
        self.start(DeliveryKind::PrintOnly, message).await
    }

    async fn identify_recipient(
        &self,
        identification: &Identification,
    ) -> Result<IdentificationResult, DigipostError> {
        let uri = self.service.link(&Relation::IdentifyRecipient).await?;
        self.service.post(uri, identification).await
    }

    async fn add_data(&self, link: &Link, data: &AdditionalData) -> Result<(), DigipostError> {
        if link.relation != Relation::AddData {
            return Err(DigipostError::InvalidArgument(format!(
                "expected an add-data link, got {}",
                link.relation
            )));
        }
        self.service.post_without_reply(link.uri.clone(), data).await
    }

    async fn search(&self, query: &str) -> Result<Recipients, DigipostError> {
        let base = self.service.link(&Relation::Search).await?;
        self.service.get(with_segments(&base, &[query])?).await
    }

    async fn autocomplete(&self, query: &str) -> Result<Autocomplete, DigipostError> {
        let base = self.service.link(&Relation::Autocomplete).await?;
        self.service.get(with_segments(&base, &[query])?).await
    }

    async fn document_events(
        &self,
        query: &DocumentEventsQuery,
    ) -> Result<DocumentEvents, DigipostError> {
        query.validate()?;
        let mut uri = self.service.link(&Relation::DocumentEvents).await?;
        uri.query_pairs_mut().extend_pairs(query.query_pairs());
        self.service.get(uri).await
    }

    async fn sender_information(
        &self,
        sender_id: SenderId,
    ) -> Result<SenderInformation, DigipostError> {
        let base = self.service.link(&Relation::SenderInformation).await?;
        let sender = sender_id.0.to_string();
        self.service.get(with_segments(&base, &[sender.as_str()])?).await
    }

    async fn sender_information_by_organisation(
        &self,
        organisation_number: &str,
        part_id: Option<&str>,
    ) -> Result<SenderInformation, DigipostError> {
        let mut uri = self.service.link(&Relation::SenderInformation).await?;
        {
            let mut pairs = uri.query_pairs_mut();
            pairs.append_pair("org_id", organisation_number);
            if let Some(part_id) = part_id {
                pairs.append_pair("part_id", part_id);
            }
        }
        self.service.get(uri).await
    }

    async fn document_status(&self, link: &Link) -> Result<DocumentStatus, DigipostError> {
        self.service.get(link.uri.clone()).await
    }

    async fn document_status_by_uuid(
        &self,
        sender_id: SenderId,
        uuid: Uuid,
    ) -> Result<DocumentStatus, DigipostError> {
        let uuid = uuid.to_string();
        let uri = self.sender_resource(sender_id, &["document", uuid.as_str(), "status"])?;
        self.service.get(uri).await
    }

    async fn content(&self, path: &str) -> Result<Bytes, DigipostError> {
        let uri = self
            .service
            .api_root()
            .join(path.trim_start_matches('/'))
            .map_err(TransportError::from)?;
        self.service.get_bytes(uri).await
    }

    async fn inbox(&self, sender_id: SenderId, page: InboxPage) -> Result<Inbox, DigipostError> {
        let mut uri = self.sender_resource(sender_id, &["inbox"])?;
        uri.query_pairs_mut()
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string());
        self.service.get(uri).await
    }

    async fn inbox_document_content(
        &self,
        document: &InboxDocument,
    ) -> Result<Bytes, DigipostError> {
        self.service.get_bytes(document.content_uri.clone()).await
    }

    async fn delete_inbox_document(&self, document: &InboxDocument) -> Result<(), DigipostError> {
        let uri = document.delete_uri.clone().ok_or_else(|| {
            DigipostError::InvalidArgument(format!(
                "inbox document {} cannot be deleted",
                document.id
            ))
        })?;
        self.service.delete(uri).await
    }

    async fn create_or_activate_user_account(
        &self,
        sender_id: SenderId,
        user: &UserInformation,
    ) -> Result<UserAccount, DigipostError> {
        let base = self
            .service
            .link(&Relation::CreateOrActivateUserAccount)
            .await?;
        let sender = sender_id.0.to_string();
        self.service
            .post(with_segments(&base, &[sender.as_str()])?, user)
            .await
    }
}
