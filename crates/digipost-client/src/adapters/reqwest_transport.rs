//! HTTP transport over reqwest (rustls).

use crate::domain::config::ClientConfig;
use crate::domain::errors::TransportError;
use crate::ports::outbound::{HttpRequest, HttpResponse, RequestBody, Transport};
use async_trait::async_trait;
use http::header::{HeaderValue, CONTENT_LENGTH};
use reqwest::{Body, Client};
use tokio_util::io::ReaderStream;

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Use an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            uri,
            mut headers,
            body,
        } = request;

        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.length()));
        let body = match body {
            RequestBody::Empty => Body::from(Vec::new()),
            RequestBody::Bytes(bytes) => Body::from(bytes),
            RequestBody::Stream { reader, .. } => Body::wrap_stream(ReaderStream::new(reader)),
        };

        let response = self
            .client
            .request(method, uri.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| classify(e, &uri))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| classify(e, &uri))?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(error: reqwest::Error, uri: &url::Url) -> TransportError {
    if error.is_connect() {
        TransportError::Connect(format!("cannot connect to {uri}: {error}"))
    } else if error.is_timeout() {
        TransportError::Timeout(format!("{uri}: {error}"))
    } else if error.is_body() || error.is_decode() {
        TransportError::Io(error.to_string())
    } else {
        TransportError::Http(error.to_string())
    }
}
