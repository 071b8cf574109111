//! Async transport seam between `FetchService` and the network.
//!
//! # Design
//! The client core only speaks `HttpRequest` / `HttpResponse`. A `Transport`
//! executes one request and hands back whatever the server said, including
//! 4xx/5xx statuses; it fails only when there is no response at all. Once a
//! non-200 status line has arrived, a body that cannot be read is replaced by
//! an empty one, since the classifier never looks at it. The production
//! implementation is `ReqwestTransport`; tests plug in canned transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes a single HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport. `timeout` of `None` keeps reqwest's default.
    pub fn new(timeout: Option<Duration>, user_agent: &str) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
        };
        let response = builder.headers(headers).send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) if status != StatusCode::OK.as_u16() => {
                tracing::debug!(status, error = %e, "discarding unreadable error body");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
