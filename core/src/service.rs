//! Fetch Service: one markets round trip, classified.
//!
//! # Design
//! `FetchService` glues the deterministic `MarketsClient` to a `Transport`.
//! It offers the same operation in two styles:
//! - `fetch_coins` is a plain `async fn`; the caller decides where and when
//!   it is polled.
//! - `fetch_coins_with_callback` detaches the fetch onto the tokio runtime and
//!   reports through a completion callback, for hosts that are not async.
//!
//! Both styles surface every failure variant; nothing is only logged.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::client::MarketsClient;
use crate::error::FetchError;
use crate::transport::Transport;
use crate::types::CoinRecord;

pub struct FetchService<T> {
    client: MarketsClient,
    transport: T,
}

impl<T: Transport> FetchService<T> {
    pub fn new(client: MarketsClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &MarketsClient {
        &self.client
    }

    /// Fetch the first page of coins. An invalid URL fails before the
    /// transport is touched; there is no retry and no caching.
    pub async fn fetch_coins(&self) -> Result<Vec<CoinRecord>, FetchError> {
        let request = self.client.build_markets_request().inspect_err(|e| {
            tracing::warn!(error = %e, kind = e.kind(), "markets request not built");
        })?;
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            "fetching coin markets"
        );

        let response = self.transport.execute(request).await.map_err(|cause| {
            let err = FetchError::unknown(cause);
            tracing::warn!(error = %err, kind = err.kind(), "markets request failed");
            err
        })?;

        match self.client.parse_markets_response(response) {
            Ok(coins) => {
                tracing::info!(count = coins.len(), "coin markets loaded");
                Ok(coins)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "markets response rejected");
                Err(e)
            }
        }
    }

    /// Run `fetch_coins` on the current tokio runtime and hand the result to
    /// `callback` exactly once. The callback runs on a runtime worker; the
    /// host must marshal it onto its own context before touching UI state.
    ///
    /// Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn fetch_coins_with_callback<F>(self: &Arc<Self>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<CoinRecord>, FetchError>) + Send + 'static,
    {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let result = service.fetch_coins().await;
            callback(result);
        })
    }
}
