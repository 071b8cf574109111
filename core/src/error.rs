//! Error types for the coin markets client.
//!
//! # Design
//! `FetchError` is the flat taxonomy surfaced to the list view: every failed
//! fetch lands in exactly one variant and is stored as the current error.
//! Values are `Clone` because the presentation state is broadcast to
//! observers by value; the transport cause is therefore held behind an `Arc`.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error produced by a `Transport` when no response was received.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a single fetch attempt did not produce a coin list.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request URL could not be built from the configured base endpoint.
    /// No network call is made.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a status other than 200. The body is dropped.
    #[error("server error: HTTP {status}")]
    ServerError { status: u16 },

    /// The 200 body was not a JSON array of coin records.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Any other failure, e.g. connection refused or a cancelled request.
    #[error("unknown error: {0}")]
    Unknown(#[source] Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl FetchError {
    /// Wrap a transport failure.
    pub fn unknown(cause: TransportError) -> Self {
        FetchError::Unknown(Arc::from(cause))
    }

    /// Short, stable name of the variant, used in logs and across the C ABI.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "invalid_url",
            FetchError::ServerError { .. } => "server_error",
            FetchError::InvalidData(_) => "invalid_data",
            FetchError::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn server_error_display_includes_status() {
        let err = FetchError::ServerError { status: 503 };
        assert_eq!(err.to_string(), "server error: HTTP 503");
        assert_eq!(err.kind(), "server_error");
    }

    #[test]
    fn unknown_keeps_its_cause() {
        let cause: TransportError = "connection refused".into();
        let err = FetchError::unknown(cause);
        assert_eq!(err.kind(), "unknown");
        assert_eq!(err.source().unwrap().to_string(), "connection refused");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn clones_share_the_cause() {
        let err = FetchError::unknown("timed out".into());
        let copy = err.clone();
        match (err, copy) {
            (FetchError::Unknown(a), FetchError::Unknown(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => unreachable!(),
        }
    }
}
