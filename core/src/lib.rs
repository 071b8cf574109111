//! Market-data fetch core for the live-prices list.
//!
//! # Overview
//! Fetches the first page of coin markets from a CoinGecko-style REST
//! endpoint and keeps the result in an observable presentation state that a
//! list renderer draws from.
//!
//! # Design
//! - `MarketsClient` is stateless: it builds the `HttpRequest` and classifies
//!   the `HttpResponse` (host-does-IO), so it also works across the C ABI.
//! - `FetchService` runs the round trip through a `Transport`, either as an
//!   `async fn` or with a completion callback. `blocking` offers the same on a
//!   plain OS thread via `ureq`.
//! - `CoinListModel` owns `PresentationState` and publishes it through a
//!   `watch` channel; `refresh` returns an explicit `FetchTask`.
//! - Every failure ends up as one `FetchError` variant in the state.

pub mod blocking;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod service;
pub mod state;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::MarketsClient;
pub use config::{ConfigError, FetchConfig};
pub use error::FetchError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use model::{CoinListModel, FetchOutcome, FetchTask};
pub use service::FetchService;
pub use state::{PresentationState, RefreshPolicy};
pub use transport::{ReqwestTransport, Transport};
pub use types::CoinRecord;
