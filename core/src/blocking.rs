//! Blocking fetch for hosts without an async runtime.
//!
//! # Design
//! Uses a `ureq` agent with status-as-error disabled so 4xx/5xx responses
//! come back as data and go through the same `MarketsClient` classification
//! as the async path. `fetch_coins_on_thread` is the completion-handler
//! style: the request runs on its own OS thread and the callback fires there.

use std::thread;
use std::time::Duration;

use crate::client::MarketsClient;
use crate::error::{FetchError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::CoinRecord;

/// Build a `ureq` agent that reports HTTP statuses as responses.
pub fn agent(timeout: Option<Duration>) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .build()
        .new_agent()
}

/// Execute one request with `ureq`. A failed body read after a non-200
/// status yields an empty body rather than an error.
pub fn execute(agent: &ureq::Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let mut builder = match request.method {
        HttpMethod::Get => agent.get(&request.url),
    };
    for (key, value) in &request.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    let mut response = builder.call()?;

    let status = response.status().as_u16();
    let body = match response.body_mut().read_to_vec() {
        Ok(body) => body,
        Err(e) if status != 200 => {
            tracing::debug!(status, error = %e, "discarding unreadable error body");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };
    Ok(HttpResponse::new(status, body))
}

/// Synchronous counterpart of `FetchService::fetch_coins`.
pub fn fetch_coins_blocking(
    client: &MarketsClient,
    agent: &ureq::Agent,
) -> Result<Vec<CoinRecord>, FetchError> {
    let request = client.build_markets_request()?;
    tracing::debug!(
        method = request.method.as_str(),
        url = %request.url,
        "fetching coin markets (blocking)"
    );
    let response = execute(agent, &request).map_err(FetchError::unknown)?;
    client.parse_markets_response(response)
}

/// Fetch on a dedicated thread and report through `callback` exactly once.
pub fn fetch_coins_on_thread<F>(
    client: MarketsClient,
    agent: ureq::Agent,
    callback: F,
) -> thread::JoinHandle<()>
where
    F: FnOnce(Result<Vec<CoinRecord>, FetchError>) + Send + 'static,
{
    thread::spawn(move || {
        let result = fetch_coins_blocking(&client, &agent);
        if let Err(e) = &result {
            tracing::warn!(error = %e, kind = e.kind(), "blocking markets fetch failed");
        }
        callback(result);
    })
}
