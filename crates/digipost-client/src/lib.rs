//! # Digipost Client
//!
//! Send digital and physical mail through the Digipost API.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): configuration, errors, query parameters
//! - **Ports Layer** (`ports/`): [`DigipostApi`] (inbound), [`Transport`],
//!   [`DeliveryBackend`] and [`Clock`] (outbound)
//! - **Service Layer** (`service.rs`): [`ApiService`], the signed exchange pipeline
//! - **Delivery** (`delivery.rs`): the create / add content / send state machine
//! - **Adapters** (`adapters/`): reqwest transport, [`MockDigipostClient`]
//!
//! ## Example
//!
//! ```no_run
//! use digipost_client::{ClientConfig, DigipostApi, DigipostClient};
//! use digipost_representations::{Document, FileType, Message};
//! use uuid::Uuid;
//!
//! # async fn run() -> Result<(), digipost_client::DigipostError> {
//! let config = ClientConfig::from_env()?;
//! let client = DigipostClient::from_key_file(config, "broker.p12", Some("secret"))?;
//!
//! let primary = Document::new(Uuid::new_v4(), "Invitation", FileType::pdf());
//! let uuid = primary.uuid;
//! let message = Message::builder(Uuid::new_v4().to_string(), primary)
//!     .digipost_address("ola.nordmann#1234")
//!     .build()?;
//!
//! let mut delivery = client.create_message(message).await?;
//! delivery.add_content(uuid, tokio::fs::File::open("letter.pdf").await?).await?;
//! let sent = delivery.send().await?;
//! println!("{} via {}", sent.status, sent.delivery_method);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod client;
pub mod content;
pub mod delivery;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::mock::{MockDigipostClient, MockRequest};
pub use adapters::reqwest_transport::ReqwestTransport;
pub use client::DigipostClient;
pub use content::PreparedContent;
pub use delivery::{DeliveryKind, DeliveryState, DocumentState, OngoingDelivery};
pub use domain::config::{ClientConfig, ConfigError, DEFAULT_API_URL};
pub use domain::errors::{DigipostError, ErrorCode, TransportError};
pub use domain::queries::{DocumentEventsQuery, InboxPage, DEFAULT_PAGE_SIZE, MAX_INBOX_PAGE_SIZE};
pub use ports::inbound::DigipostApi;
pub use ports::outbound::{
    BoxedContent, Clock, ContentSource, DeliveryBackend, HttpRequest, HttpResponse, RequestBody,
    SystemClock, Transport,
};
pub use service::ApiService;
