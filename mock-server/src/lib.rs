use std::{collections::VecDeque, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: String,
    pub current_price: f64,
    pub price_change_percentage_24h: Option<f64>,
}

/// One canned answer for `GET /markets`.
#[derive(Clone, Debug)]
pub struct MarketsReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MarketsReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn coins(coins: &[Coin]) -> Self {
        Self::ok(serde_json::to_string(coins).unwrap_or_else(|_| "[]".to_string()))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug)]
struct Script {
    queued: VecDeque<MarketsReply>,
    fallback: MarketsReply,
    queries: Vec<String>,
}

/// Scripted markets endpoint. Queued replies are served first, in order;
/// after that every request gets the fallback. Raw query strings of all
/// requests are recorded.
#[derive(Clone, Debug)]
pub struct MarketsMock {
    script: Arc<Mutex<Script>>,
}

impl Default for MarketsMock {
    fn default() -> Self {
        Self::new(MarketsReply::coins(&sample_coins()))
    }
}

impl MarketsMock {
    pub fn new(fallback: MarketsReply) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                queued: VecDeque::new(),
                fallback,
                queries: Vec::new(),
            })),
        }
    }

    pub fn enqueue(&self, reply: MarketsReply) -> &Self {
        self.script.lock().queued.push_back(reply);
        self
    }

    pub fn set_fallback(&self, reply: MarketsReply) {
        self.script.lock().fallback = reply;
    }

    pub fn queries(&self) -> Vec<String> {
        self.script.lock().queries.clone()
    }

    pub fn hits(&self) -> usize {
        self.script.lock().queries.len()
    }

    fn next_reply(&self, query: String) -> MarketsReply {
        let mut script = self.script.lock();
        script.queries.push(query);
        match script.queued.pop_front() {
            Some(reply) => reply,
            None => script.fallback.clone(),
        }
    }
}

pub fn app(mock: MarketsMock) -> Router {
    Router::new()
        .route("/markets", get(list_markets))
        .with_state(mock)
}

pub async fn run(listener: TcpListener, mock: MarketsMock) -> Result<(), std::io::Error> {
    axum::serve(listener, app(mock)).await
}

/// Serve `mock` on an ephemeral localhost port in the background.
pub async fn spawn(mock: MarketsMock) -> Result<SocketAddr, std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(run(listener, mock));
    Ok(addr)
}

async fn list_markets(State(mock): State<MarketsMock>, RawQuery(query): RawQuery) -> Response {
    let reply = mock.next_reply(query.unwrap_or_default());
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

pub fn sample_coins() -> Vec<Coin> {
    let coin = |id: &str, name: &str, symbol: &str, price: f64, change: Option<f64>| Coin {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        image: format!("https://assets.example.com/coins/{id}.png"),
        current_price: price,
        price_change_percentage_24h: change,
    };
    vec![
        coin("bitcoin", "Bitcoin", "btc", 50000.0, Some(1.5)),
        coin("ethereum", "Ethereum", "eth", 3000.25, Some(-0.82)),
        coin("tether", "Tether", "usdt", 1.0, None),
        coin("solana", "Solana", "sol", 142.7, Some(4.11)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_serializes_to_json() {
        let json = serde_json::to_value(&sample_coins()[0]).unwrap();
        assert_eq!(json["id"], "bitcoin");
        assert_eq!(json["current_price"], 50000.0);
        assert_eq!(json["price_change_percentage_24h"], 1.5);
    }

    #[test]
    fn missing_change_serializes_as_null() {
        let json = serde_json::to_value(&sample_coins()[2]).unwrap();
        assert!(json["price_change_percentage_24h"].is_null());
    }

    #[test]
    fn queued_replies_come_before_fallback() {
        let mock = MarketsMock::new(MarketsReply::ok("[]"));
        mock.enqueue(MarketsReply::status(500, ""))
            .enqueue(MarketsReply::status(404, "nope"));

        assert_eq!(mock.next_reply("a=1".to_string()).status, 500);
        assert_eq!(mock.next_reply(String::new()).status, 404);
        assert_eq!(mock.next_reply(String::new()).status, 200);
        assert_eq!(mock.hits(), 3);
        assert_eq!(mock.queries()[0], "a=1");
    }

    #[test]
    fn fallback_can_be_replaced() {
        let mock = MarketsMock::default();
        mock.set_fallback(MarketsReply::status(503, ""));
        assert_eq!(mock.next_reply(String::new()).status, 503);
    }
}
