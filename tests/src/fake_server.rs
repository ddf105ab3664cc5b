//! # Fake Digipost Server
//!
//! An in-process [`Transport`] that behaves like the Digipost API for the
//! delivery protocol: it checks every request signature against the broker's
//! public key and signs every response with its own key.
//!
//! Responses can be tampered with after signing to exercise the client's
//! verification path.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use digipost_client::{
    ClientConfig, HttpRequest, HttpResponse, RequestBody, Transport, TransportError,
};
use digipost_representations::{
    deserialize, serialize, Channel, Document, DocumentEvents, DocumentStatus, DeliveryStatus,
    EntryPoint, ErrorMessage, ErrorType, Inbox, InboxDocument, Link, Message, MessageDelivery,
    MessageStatus, Relation, RootElement, MEDIA_TYPE,
};
use digipost_security::{
    format_http_date, headers, CanonicalRequest, CanonicalResponse, ContentDigest,
    RsaSha256Signer, ServerCertificate, Signer,
};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use parking_lot::Mutex;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::io::AsyncReadExt;
use url::Url;
use uuid::Uuid;

pub const API_URL: &str = "https://fake.digipost.test/api/";
pub const BROKER_ID: u64 = 1003;

// =============================================================================
// KEYS
// =============================================================================

/// Broker key. Generated once per test binary.
pub fn client_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

/// Key the fake server signs responses with.
pub fn server_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

/// A key nobody trusts.
pub fn rogue_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

/// Self-signed X.509 certificate for [`certified_server_key`], the form the
/// production entry point publishes.
pub const SERVER_CERTIFICATE: &str = include_str!("../fixtures/server-cert.pem");

/// Server key with a checked-in certificate.
pub fn certified_server_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::from_pkcs8_pem(include_str!("../fixtures/server-key.pem")).unwrap()
    })
}

pub fn public_key_pem(key: &RsaPrivateKey) -> String {
    key.to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap()
}

pub fn client_signer() -> Arc<RsaSha256Signer> {
    Arc::new(RsaSha256Signer::new(client_key().clone()))
}

pub fn config() -> ClientConfig {
    ClientConfig::new(Url::parse(API_URL).unwrap(), BROKER_ID)
}

// =============================================================================
// STATE
// =============================================================================

/// How the next response is damaged after it has been signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tamper {
    /// Flip a byte of the signature.
    Signature,
    /// Append to the body without re-signing.
    Body,
    /// Echo a different nonce.
    Nonce,
}

/// One request as the server received it.
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Debug)]
struct StoredMessage {
    message: Message,
    contents: HashMap<Uuid, Bytes>,
    sent: bool,
}

#[derive(Debug, Default)]
struct ServerState {
    received: Vec<ReceivedRequest>,
    messages: HashMap<String, StoredMessage>,
    inbox: Vec<InboxDocument>,
    events: DocumentEvents,
    tamper: Option<Tamper>,
    entry_point_status: Option<StatusCode>,
}

/// The fake API. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct FakeDigipost {
    base: Url,
    advertised_certificate: String,
    signer: Arc<RsaSha256Signer>,
    client_certificate: ServerCertificate,
    state: Arc<Mutex<ServerState>>,
}

impl Default for FakeDigipost {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDigipost {
    pub fn new() -> Self {
        Self {
            base: Url::parse(API_URL).unwrap(),
            advertised_certificate: public_key_pem(server_key()),
            signer: Arc::new(RsaSha256Signer::new(server_key().clone())),
            client_certificate: ServerCertificate::from_public_key(client_key().to_public_key()),
            state: Arc::new(Mutex::new(ServerState::default())),
        }
    }

    /// Sign with [`certified_server_key`] and publish [`SERVER_CERTIFICATE`].
    pub fn with_certificate() -> Self {
        Self {
            advertised_certificate: SERVER_CERTIFICATE.to_string(),
            signer: Arc::new(RsaSha256Signer::new(certified_server_key().clone())),
            ..Self::new()
        }
    }

    /// Publish `pem` in the entry point instead of the real signing key.
    pub fn advertising(mut self, pem: String) -> Self {
        self.advertised_certificate = pem;
        self
    }

    pub fn tamper_next(&self, tamper: Tamper) {
        self.state.lock().tamper = Some(tamper);
    }

    /// Answer the entry point with `status` and an error body.
    pub fn fail_entry_point(&self, status: StatusCode) {
        self.state.lock().entry_point_status = Some(status);
    }

    pub fn set_events(&self, events: DocumentEvents) {
        self.state.lock().events = events;
    }

    pub fn add_inbox_document(&self, document: InboxDocument) {
        self.state.lock().inbox.push(document);
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.lock().received.clone()
    }

    pub fn uploaded(&self, message_id: &str, uuid: &Uuid) -> Option<Bytes> {
        self.state
            .lock()
            .messages
            .get(message_id)
            .and_then(|m| m.contents.get(uuid).cloned())
    }

    pub fn is_sent(&self, message_id: &str) -> bool {
        self.state
            .lock()
            .messages
            .get(message_id)
            .is_some_and(|m| m.sent)
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    fn route(&self, method: &Method, uri: &Url, body: &[u8]) -> (StatusCode, Bytes) {
        let relative = uri
            .path()
            .strip_prefix(self.base.path())
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = if relative.is_empty() {
            Vec::new()
        } else {
            relative.split('/').collect()
        };

        match (method.as_str(), segments.as_slice()) {
            ("GET", []) => self.entry_point(),
            ("POST", ["messages"]) => match deserialize::<Message>(body) {
                Ok(message) => self.create_message(message),
                Err(e) => error(StatusCode::BAD_REQUEST, ErrorType::ClientData, &e.to_string()),
            },
            ("POST", ["messages", id, "documents", uuid, "content"]) => {
                self.add_content(id, uuid, body)
            }
            ("POST", ["messages", id, "send"]) => self.send(id),
            ("GET", ["events"]) => ok(&self.state.lock().events),
            ("GET", [_, "inbox"]) => ok(&Inbox {
                documents: self.state.lock().inbox.clone(),
            }),
            ("GET", [_, "document", uuid, "status"]) => self.document_status(uuid),
            _ => error(StatusCode::NOT_FOUND, ErrorType::ClientData, "no such resource"),
        }
    }

    fn entry_point(&self) -> (StatusCode, Bytes) {
        if let Some(status) = self.state.lock().entry_point_status {
            return error(status, ErrorType::Server, "maintenance");
        }
        let link = |relation, path| Link::new(relation, self.url(path));
        ok(&EntryPoint {
            certificate: self.advertised_certificate.clone(),
            links: vec![
                link(Relation::CreateMessage, "messages"),
                link(Relation::DocumentEvents, "events"),
                link(Relation::Search, "recipients/search"),
            ],
        })
    }

    fn create_message(&self, message: Message) -> (StatusCode, Bytes) {
        let mut state = self.state.lock();
        let id = message.message_id().to_string();
        if state.messages.contains_key(&id) {
            let mut rejection = ErrorMessage::new(ErrorType::ClientData, "message id already used");
            rejection.error_code = Some("DUPLICATE_MESSAGE_ID".to_string());
            return respond(StatusCode::CONFLICT, &rejection);
        }
        state.messages.insert(
            id.clone(),
            StoredMessage {
                message,
                contents: HashMap::new(),
                sent: false,
            },
        );
        self.delivery(&state, &id)
    }

    fn add_content(&self, id: &str, uuid: &str, body: &[u8]) -> (StatusCode, Bytes) {
        let mut state = self.state.lock();
        let Ok(uuid) = Uuid::parse_str(uuid) else {
            return error(StatusCode::BAD_REQUEST, ErrorType::ClientData, "bad uuid");
        };
        let Some(stored) = state.messages.get_mut(id) else {
            return error(StatusCode::NOT_FOUND, ErrorType::ClientData, "unknown message");
        };
        if stored.sent || stored.contents.contains_key(&uuid) {
            return error(StatusCode::CONFLICT, ErrorType::ClientData, "content already added");
        }
        stored.contents.insert(uuid, Bytes::copy_from_slice(body));
        self.delivery(&state, id)
    }

    fn send(&self, id: &str) -> (StatusCode, Bytes) {
        let mut state = self.state.lock();
        let Some(stored) = state.messages.get_mut(id) else {
            return error(StatusCode::NOT_FOUND, ErrorType::ClientData, "unknown message");
        };
        let missing = stored
            .message
            .all_documents()
            .any(|d| !stored.contents.contains_key(&d.uuid));
        if missing {
            return error(StatusCode::CONFLICT, ErrorType::ClientData, "content missing");
        }
        stored.sent = true;
        self.delivery(&state, id)
    }

    fn document_status(&self, uuid: &str) -> (StatusCode, Bytes) {
        let Ok(uuid) = Uuid::parse_str(uuid) else {
            return error(StatusCode::BAD_REQUEST, ErrorType::ClientData, "bad uuid");
        };
        let state = self.state.lock();
        let sent = state
            .messages
            .values()
            .find(|m| m.message.document_by_uuid(&uuid).is_ok())
            .map(|m| m.sent);
        match sent {
            Some(sent) => {
                let status = if sent {
                    DeliveryStatus::Delivered
                } else {
                    DeliveryStatus::NotDelivered
                };
                ok(&DocumentStatus::new(uuid, status))
            }
            None => error(StatusCode::NOT_FOUND, ErrorType::ClientData, "unknown document"),
        }
    }

    fn delivery(&self, state: &ServerState, id: &str) -> (StatusCode, Bytes) {
        let Some(stored) = state.messages.get(id) else {
            return error(StatusCode::NOT_FOUND, ErrorType::ClientData, "unknown message");
        };
        let channel = if stored.message.is_direct_print() {
            Channel::Print
        } else {
            Channel::Digipost
        };
        let status = match (stored.sent, channel) {
            (false, _) => MessageStatus::NotComplete,
            (true, Channel::Digipost) => MessageStatus::Delivered,
            (true, Channel::Print) => MessageStatus::DeliveredToPrint,
        };
        let mut delivery = MessageDelivery::new(id, channel, status);

        let view = |document: &Document| {
            let mut document = document.clone();
            document.links.clear();
            if !stored.sent && !stored.contents.contains_key(&document.uuid) {
                document.links.push(Link::new(
                    Relation::AddContent,
                    self.url(&format!("messages/{id}/documents/{}/content", document.uuid)),
                ));
            }
            document
        };
        delivery.primary_document = Some(view(stored.message.primary_document()));
        delivery.attachments = stored.message.attachments().iter().map(view).collect();

        if stored.sent {
            delivery.delivery_time = Some(Utc::now().fixed_offset());
        } else {
            delivery
                .links
                .push(Link::new(Relation::Send, self.url(&format!("messages/{id}/send"))));
        }
        ok(&delivery)
    }

    // =========================================================================
    // SIGNING
    // =========================================================================

    fn authenticate(&self, request: &HttpRequest, body: &[u8]) -> Result<(), String> {
        let user_id = header(&request.headers, headers::USER_ID)?;
        if user_id != BROKER_ID.to_string() {
            return Err(format!("unknown broker {user_id}"));
        }
        let declared = header(&request.headers, headers::CONTENT_SHA256)?;
        if declared != ContentDigest::of(body).as_str() {
            return Err("body does not match x-content-sha256".to_string());
        }
        let signature = STANDARD
            .decode(header(&request.headers, headers::SIGNATURE)?)
            .map_err(|e| e.to_string())?;
        let canonical = CanonicalRequest::new(&request.method, &request.uri, &request.headers)
            .map_err(|e| e.to_string())?;
        if !self.client_certificate.verify(canonical.as_str(), &signature) {
            return Err("request signature does not verify".to_string());
        }
        Ok(())
    }

    fn sign(
        &self,
        request: &HttpRequest,
        status: StatusCode,
        body: Bytes,
        tamper: Option<Tamper>,
    ) -> HttpResponse {
        let nonce = request
            .headers
            .get(headers::NONCE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));

        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        map.insert(headers::DATE, value(&format_http_date(Utc::now())));
        map.insert(headers::CONTENT_SHA256, value(ContentDigest::of(&body).as_str()));
        map.insert(headers::NONCE, nonce);
        let canonical = CanonicalResponse::new(status, &request.uri, &map).unwrap();
        let mut signature = self.signer.sign(canonical.as_str()).unwrap();

        let mut body = body;
        match tamper {
            Some(Tamper::Signature) => signature[0] ^= 0xff,
            Some(Tamper::Body) => {
                let mut altered = body.to_vec();
                altered.extend_from_slice(b"<!-- injected -->");
                body = Bytes::from(altered);
            }
            Some(Tamper::Nonce) => {
                map.insert(headers::NONCE, value(&Uuid::new_v4().to_string()));
            }
            None => {}
        }
        map.insert(headers::SIGNATURE, value(&STANDARD.encode(signature)));

        HttpResponse {
            status,
            headers: map,
            body,
        }
    }
}

#[async_trait::async_trait]
impl Transport for FakeDigipost {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            uri,
            headers,
            body,
        } = request;
        let body = match body {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(bytes) => bytes,
            RequestBody::Stream { mut reader, length } => {
                let mut buffer = Vec::with_capacity(length as usize);
                reader.read_to_end(&mut buffer).await?;
                Bytes::from(buffer)
            }
        };
        let request = HttpRequest {
            method,
            uri,
            headers,
            body: RequestBody::Empty,
        };

        self.state.lock().received.push(ReceivedRequest {
            method: request.method.clone(),
            path: request.uri.path().to_string(),
            query: request.uri.query().map(str::to_string),
            content_type: request
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: body.clone(),
        });

        let (status, reply) = match self.authenticate(&request, &body) {
            Ok(()) => self.route(&request.method, &request.uri, &body),
            Err(reason) => {
                tracing::debug!(%reason, "Fake server refused request");
                error(StatusCode::FORBIDDEN, ErrorType::ClientTechnical, &reason)
            }
        };
        let tamper = self.state.lock().tamper.take();
        Ok(self.sign(&request, status, reply, tamper))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn ok<T: RootElement>(value: &T) -> (StatusCode, Bytes) {
    respond(StatusCode::OK, value)
}

fn respond<T: RootElement>(status: StatusCode, value: &T) -> (StatusCode, Bytes) {
    (status, Bytes::from(serialize(value).unwrap()))
}

fn error(status: StatusCode, error_type: ErrorType, message: &str) -> (StatusCode, Bytes) {
    respond(status, &ErrorMessage::new(error_type, message))
}

fn header<'a>(map: &'a HeaderMap, name: &'static str) -> Result<&'a str, String> {
    map.get(name)
        .ok_or_else(|| format!("missing {name}"))?
        .to_str()
        .map_err(|e| e.to_string())
}

fn value(text: &str) -> HeaderValue {
    HeaderValue::from_str(text).unwrap()
}
