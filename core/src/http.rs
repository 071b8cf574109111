//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `MarketsClient` builds an
//! `HttpRequest` and classifies an `HttpResponse` without touching the
//! network; a `Transport` (or a native host through the C ABI) performs the
//! round trip in between.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries and thread hops without lifetime concerns. Response bodies are
//! raw bytes: text decoding belongs to the classifier, not the transport.

/// HTTP method for a request. The markets endpoint is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// Non-2xx statuses are still responses; only a missing response is a
/// transport error.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
