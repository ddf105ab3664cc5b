//! # API Service
//!
//! Performs every exchange with the API:
//!
//! ```text
//! serialize -> digest -> sign -> transport -> verify -> reject non-2xx -> deserialize
//! ```
//!
//! The entry point is fetched once per service and supplies the operation
//! links and, unless a certificate is pinned, the server certificate.
//!
//! ## Security Notes
//!
//! - Responses are verified before any body is decoded, on every status code
//! - Without a pinned certificate the entry point's own certificate is trusted
//!   only if the entry-point response verifies against it

use crate::content::PreparedContent;
use crate::domain::config::{ClientConfig, ConfigError};
use crate::domain::errors::{DigipostError, TransportError};
use crate::ports::outbound::{
    BoxedContent, Clock, DeliveryBackend, HttpRequest, HttpResponse, RequestBody, SystemClock,
    Transport,
};
use async_trait::async_trait;
use bytes::Bytes;
use digipost_representations::{
    deserialize, serialize, EntryPoint, ErrorMessage, ErrorType, Link, Message, MessageDelivery,
    Relation, RootElement, MEDIA_TYPE,
};
use digipost_security::{
    ensure_algorithms_available, ContentDigest, Exchange, RequestAuthenticator, ResponseVerifier,
    SecurityError, ServerCertificate, Signer,
};
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// State established by the first exchange.
struct Session {
    entry_point: EntryPoint,
    verifier: ResponseVerifier,
}

pub struct ApiService {
    config: ClientConfig,
    api_root: Url,
    user_agent: HeaderValue,
    transport: Arc<dyn Transport>,
    authenticator: RequestAuthenticator,
    clock: Arc<dyn Clock>,
    pinned: Option<ServerCertificate>,
    session: OnceCell<Session>,
}

impl ApiService {
    pub fn new(
        config: ClientConfig,
        signer: Arc<dyn Signer>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, DigipostError> {
        config.validate()?;
        ensure_algorithms_available()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let pinned = config
            .server_certificate_pem
            .as_deref()
            .map(ServerCertificate::from_pem)
            .transpose()
            .map_err(|e| ConfigError::InvalidCertificate(e.to_string()))?;
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| ConfigError::Invalid(format!("user agent: {e}")))?;

        Ok(Self {
            api_root: api_root(&config.api_url),
            user_agent,
            transport,
            authenticator: RequestAuthenticator::new(config.broker_id, signer),
            clock: Arc::new(SystemClock),
            pinned,
            session: OnceCell::new(),
            config,
        })
    }

    /// Replace the time source used for request dates and freshness checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// API root with a trailing slash, base for relative paths.
    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub async fn entry_point(&self) -> Result<&EntryPoint, DigipostError> {
        Ok(&self.session().await?.entry_point)
    }

    /// Target of an entry-point link.
    pub async fn link(&self, relation: &Relation) -> Result<Url, DigipostError> {
        self.entry_point()
            .await?
            .links
            .iter()
            .find(|l| &l.relation == relation)
            .map(|l| l.uri.clone())
            .ok_or_else(|| {
                DigipostError::illegal_state(format!("entry point offers no {relation} link"))
            })
    }

    // =========================================================================
    // TYPED EXCHANGES
    // =========================================================================

    pub async fn get<T: RootElement>(&self, uri: Url) -> Result<T, DigipostError> {
        let response = self.get_bytes(uri).await?;
        Ok(deserialize(&response)?)
    }

    pub async fn get_bytes(&self, uri: Url) -> Result<Bytes, DigipostError> {
        let response = self
            .execute(Method::GET, uri, RequestBody::Empty, ContentDigest::empty(), None)
            .await?;
        Ok(response.body)
    }

    pub async fn post<B: RootElement, T: RootElement>(
        &self,
        uri: Url,
        body: &B,
    ) -> Result<T, DigipostError> {
        let response = self.post_xml(uri, body).await?;
        Ok(deserialize(&response.body)?)
    }

    /// POST whose response carries no representation.
    pub async fn post_without_reply<B: RootElement>(
        &self,
        uri: Url,
        body: &B,
    ) -> Result<(), DigipostError> {
        self.post_xml(uri, body).await.map(|_| ())
    }

    pub async fn delete(&self, uri: Url) -> Result<(), DigipostError> {
        self.execute(Method::DELETE, uri, RequestBody::Empty, ContentDigest::empty(), None)
            .await
            .map(|_| ())
    }

    /// Stream `content` to `uri`, signed over its digest.
    pub async fn upload<T: RootElement>(
        &self,
        uri: Url,
        content: BoxedContent,
    ) -> Result<T, DigipostError> {
        let prepared = PreparedContent::prepare(content).await?;
        let digest = prepared.digest.clone();
        let response = self
            .execute(Method::POST, uri, prepared.into_body(), digest, Some(OCTET_STREAM))
            .await?;
        Ok(deserialize(&response.body)?)
    }

    async fn post_xml<B: RootElement>(
        &self,
        uri: Url,
        body: &B,
    ) -> Result<HttpResponse, DigipostError> {
        let bytes = Bytes::from(serialize(body)?);
        let digest = ContentDigest::of(&bytes);
        self.execute(Method::POST, uri, RequestBody::Bytes(bytes), digest, Some(MEDIA_TYPE))
            .await
    }

    // =========================================================================
    // PIPELINE
    // =========================================================================

    async fn execute(
        &self,
        method: Method,
        uri: Url,
        body: RequestBody,
        digest: ContentDigest,
        content_type: Option<&'static str>,
    ) -> Result<HttpResponse, DigipostError> {
        let session = self.session().await?;
        let (exchange, response) = self
            .dispatch(method, uri, body, &digest, content_type)
            .await?;
        self.check(&session.verifier, &exchange, response)
    }

    async fn session(&self) -> Result<&Session, DigipostError> {
        self.session.get_or_try_init(|| self.open_session()).await
    }

    async fn open_session(&self) -> Result<Session, DigipostError> {
        let (exchange, response) = self
            .dispatch(
                Method::GET,
                self.config.api_url.clone(),
                RequestBody::Empty,
                &ContentDigest::empty(),
                None,
            )
            .await?;

        let verifier = match &self.pinned {
            Some(certificate) => self.verifier(certificate.clone()),
            None => {
                if !response.status.is_success() {
                    return Err(DigipostError::ServerRejection {
                        status: response.status,
                        error_type: ErrorType::None,
                        code: None,
                        message: "entry point unavailable and no certificate is pinned"
                            .to_string(),
                    });
                }
                let offered: EntryPoint = deserialize(&response.body)?;
                self.verifier(ServerCertificate::from_pem(&offered.certificate)?)
            }
        };

        let response = self.check(&verifier, &exchange, response)?;
        let entry_point: EntryPoint = deserialize(&response.body)?;
        tracing::info!(
            api_url = %self.config.api_url,
            links = entry_point.links.len(),
            pinned = self.pinned.is_some(),
            "Connected to Digipost API"
        );
        Ok(Session {
            entry_point,
            verifier,
        })
    }

    fn verifier(&self, certificate: ServerCertificate) -> ResponseVerifier {
        ResponseVerifier::new(certificate)
            .with_window(self.config.max_response_age, self.config.max_future_skew)
    }

    /// Sign and send one request.
    async fn dispatch(
        &self,
        method: Method,
        uri: Url,
        body: RequestBody,
        digest: &ContentDigest,
        content_type: Option<&'static str>,
    ) -> Result<(Exchange, HttpResponse), DigipostError> {
        let nonce = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(USER_AGENT, self.user_agent.clone());
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        self.authenticator
            .authenticate(&method, &uri, &mut headers, digest, self.clock.now(), nonce)?;

        let span = tracing::debug_span!(
            "digipost_request",
            method = %method,
            uri = %uri,
            nonce = %nonce,
        );
        let exchange = Exchange {
            request_url: uri.clone(),
            nonce,
        };
        let request = HttpRequest {
            method,
            uri,
            headers,
            body,
        };
        let response = self
            .transport
            .execute(request)
            .instrument(span.clone())
            .await?;
        span.in_scope(|| {
            tracing::debug!(
                status = response.status.as_u16(),
                length = response.body.len(),
                "Response received"
            )
        });
        Ok((exchange, response))
    }

    /// Verify, then turn non-2xx responses into rejections.
    fn check(
        &self,
        verifier: &ResponseVerifier,
        exchange: &Exchange,
        response: HttpResponse,
    ) -> Result<HttpResponse, DigipostError> {
        if let Err(error) = verifier.verify(
            exchange,
            response.status,
            &response.headers,
            &response.body,
            self.clock.now(),
        ) {
            match &error {
                SecurityError::ContentDigestMismatch { .. } => tracing::warn!(
                    uri = %exchange.request_url,
                    nonce = %exchange.nonce,
                    "Response body corrupted: {}",
                    error
                ),
                _ => tracing::warn!(
                    uri = %exchange.request_url,
                    nonce = %exchange.nonce,
                    status = response.status.as_u16(),
                    "Response failed authentication: {}",
                    error
                ),
            }
            return Err(error.into());
        }

        if !response.status.is_success() {
            let rejection = rejection(&response);
            tracing::debug!(uri = %exchange.request_url, "{}", rejection);
            return Err(rejection);
        }
        Ok(response)
    }
}

fn rejection(response: &HttpResponse) -> DigipostError {
    match deserialize::<ErrorMessage>(&response.body) {
        Ok(error) => DigipostError::ServerRejection {
            status: response.status,
            error_type: error.error_type,
            code: error.error_code,
            message: error.error_message,
        },
        Err(_) => DigipostError::ServerRejection {
            status: response.status,
            error_type: ErrorType::None,
            code: None,
            message: response
                .status
                .canonical_reason()
                .unwrap_or("no error message")
                .to_string(),
        },
    }
}

fn api_root(url: &Url) -> Url {
    let mut root = url.clone();
    if !root.path().ends_with('/') {
        root.set_path(&format!("{}/", root.path()));
    }
    root
}

/// `base` with `segments` appended to its path.
pub(crate) fn with_segments(base: &Url, segments: &[&str]) -> Result<Url, DigipostError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| TransportError::InvalidUri(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl fmt::Debug for ApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiService")
            .field("api_url", &self.config.api_url.as_str())
            .field("broker_id", &self.config.broker_id)
            .field("pinned", &self.pinned.is_some())
            .field("connected", &self.session.initialized())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DeliveryBackend for ApiService {
    async fn create_message(&self, message: &Message) -> Result<MessageDelivery, DigipostError> {
        let uri = self.link(&Relation::CreateMessage).await?;
        let delivery: MessageDelivery = self.post(uri, message).await?;
        tracing::debug!(
            message_id = message.message_id(),
            status = %delivery.status,
            "Message created"
        );
        Ok(delivery)
    }

    async fn add_content(
        &self,
        link: &Link,
        content: BoxedContent,
    ) -> Result<MessageDelivery, DigipostError> {
        self.upload(link.uri.clone(), content).await
    }

    async fn send(&self, link: &Link) -> Result<MessageDelivery, DigipostError> {
        let response = self
            .execute(
                Method::POST,
                link.uri.clone(),
                RequestBody::Empty,
                ContentDigest::empty(),
                None,
            )
            .await?;
        Ok(deserialize(&response.body)?)
    }
}
