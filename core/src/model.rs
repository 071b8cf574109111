//! Presentation State Holder for the live-prices list.
//!
//! # Design
//! `CoinListModel` owns the only writable handle to `PresentationState`, a
//! `tokio::sync::watch` sender. Renderers get read access plus change
//! notification through `subscribe()`; nothing else can mutate the state.
//!
//! Fetches are explicit futures (`FetchTask`) rather than fire-and-forget
//! tasks. The state update runs where the task is polled, so a renderer that
//! needs single-context mutation polls the task on its own context (for
//! example inside a `LocalSet` or its UI runtime). Each completion is applied
//! with a single `send_modify`, so observers never see a half-applied result.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::service::FetchService;
use crate::state::{PresentationState, RefreshPolicy};
use crate::transport::Transport;
use crate::types::CoinRecord;

/// How one fetch attempt ended, as seen by the caller that polled it.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The coin list was replaced with `count` records.
    Loaded { count: usize },
    /// The error was stored in the state.
    Failed(FetchError),
    /// A newer fetch started first; the state was left untouched.
    Superseded,
}

/// A pending fetch. Await it, spawn it, or drop it to abandon the request.
pub type FetchTask = Pin<Box<dyn Future<Output = FetchOutcome> + Send + 'static>>;

pub struct CoinListModel<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for CoinListModel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    service: FetchService<T>,
    state: watch::Sender<PresentationState>,
    policy: RefreshPolicy,
    // Token of the most recently started fetch. Also serializes "cancel
    // previous" against "apply result".
    in_flight: Mutex<Option<CancellationToken>>,
}

impl<T: Transport> CoinListModel<T> {
    /// Create a model with empty state. No fetch is started.
    pub fn new(service: FetchService<T>, policy: RefreshPolicy) -> Self {
        let (state, _) = watch::channel(PresentationState::default());
        Self {
            inner: Arc::new(Inner {
                service,
                state,
                policy,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Create a model and its initial fetch in one step.
    pub fn start(service: FetchService<T>, policy: RefreshPolicy) -> (Self, FetchTask) {
        let model = Self::new(service, policy);
        let task = model.initialize();
        (model, task)
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.inner.policy
    }

    pub fn subscribe(&self) -> watch::Receiver<PresentationState> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> PresentationState {
        self.inner.state.borrow().clone()
    }

    pub fn coins(&self) -> Vec<CoinRecord> {
        self.inner.state.borrow().coins.clone()
    }

    pub fn error(&self) -> Option<FetchError> {
        self.inner.state.borrow().error.clone()
    }

    /// Start the first fetch. State is not cleared.
    pub fn initialize(&self) -> FetchTask {
        self.start_fetch()
    }

    /// Empty the coin list now, then start a new fetch.
    ///
    /// Observers see the empty list before this returns; the fetched list or
    /// an error follows when the returned task completes.
    pub fn refresh(&self) -> FetchTask {
        self.inner.state.send_modify(|state| state.coins.clear());
        self.start_fetch()
    }

    fn start_fetch(&self) -> FetchTask {
        let token = CancellationToken::new();
        if self.inner.policy.supersede_in_flight {
            if let Some(previous) = self.inner.in_flight.lock().replace(token.clone()) {
                previous.cancel();
            }
        }

        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("coin fetch superseded while in flight");
                    return FetchOutcome::Superseded;
                }
                result = inner.service.fetch_coins() => result,
            };
            inner.apply(&token, result)
        })
    }
}

impl<T> Inner<T> {
    fn apply(
        &self,
        token: &CancellationToken,
        result: Result<Vec<CoinRecord>, FetchError>,
    ) -> FetchOutcome {
        let _guard = self.in_flight.lock();
        if token.is_cancelled() {
            tracing::debug!("discarding result of superseded coin fetch");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(coins) => {
                let count = coins.len();
                let clear_error = self.policy.clear_error_on_success;
                self.state.send_modify(|state| {
                    state.coins = coins;
                    if clear_error {
                        state.error = None;
                    }
                });
                FetchOutcome::Loaded { count }
            }
            Err(err) => {
                let stored = err.clone();
                self.state.send_modify(|state| state.error = Some(stored));
                FetchOutcome::Failed(err)
            }
        }
    }
}
