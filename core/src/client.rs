//! Stateless request builder and response classifier for the markets endpoint.
//!
//! # Design
//! `MarketsClient` holds only a `base_url` and carries no mutable state
//! between calls. The single operation is split into
//! `build_markets_request`, which produces an `HttpRequest`, and
//! `parse_markets_response`, which turns an `HttpResponse` into coins or a
//! classified `FetchError`. The caller executes the round trip, keeping the
//! client deterministic and free of I/O.

use reqwest::Url;

use crate::error::FetchError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::CoinRecord;

/// Public CoinGecko v3 coins endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3/coins";

/// Fixed query: USD quotes, top 50 by market cap, first page, 24h change.
pub const MARKETS_QUERY: [(&str, &str); 5] = [
    ("vs_currency", "usd"),
    ("order", "market_cap_desc"),
    ("per_page", "50"),
    ("page", "1"),
    ("price_change_percentage", "24h"),
];

/// Synchronous, stateless client for the coin markets endpoint.
#[derive(Debug, Clone)]
pub struct MarketsClient {
    base_url: String,
}

impl Default for MarketsClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl MarketsClient {
    /// Base URL validation is deferred to `build_markets_request`, so a bad
    /// base surfaces as `FetchError::InvalidUrl` on the first fetch.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_markets_request(&self) -> Result<HttpRequest, FetchError> {
        let raw = format!("{}/markets", self.base_url);
        let mut url =
            Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{raw}: unsupported scheme `{}`",
                url.scheme()
            )));
        }
        url.query_pairs_mut().extend_pairs(MARKETS_QUERY);

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    /// Classify a markets response. The body is only decoded on status 200,
    /// and decoding is all-or-nothing for the whole array. Bytes that are not
    /// valid UTF-8 are a decode failure like any other malformed JSON.
    pub fn parse_markets_response(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<CoinRecord>, FetchError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|e| FetchError::InvalidData(e.to_string()))
    }
}

fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.status == 200 {
        Ok(())
    } else {
        Err(FetchError::ServerError {
            status: response.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITCOIN: &str = r#"{"id":"bitcoin","name":"Bitcoin","symbol":"btc","image":"x","current_price":50000,"price_change_percentage_24h":1.5}"#;

    fn client() -> MarketsClient {
        MarketsClient::new("http://localhost:3000")
    }

    #[test]
    fn build_markets_request_produces_correct_request() {
        let req = client().build_markets_request().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:3000/markets?vs_currency=usd&order=market_cap_desc&per_page=50&page=1&price_change_percentage=24h"
        );
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn default_client_targets_coingecko() {
        let req = MarketsClient::default().build_markets_request().unwrap();
        assert!(req
            .url
            .starts_with("https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = MarketsClient::new("http://localhost:3000/")
            .build_markets_request()
            .unwrap();
        assert!(req.url.starts_with("http://localhost:3000/markets?"));
    }

    #[test]
    fn relative_base_is_invalid_url() {
        let err = MarketsClient::new("not a url").build_markets_request().unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn empty_base_is_invalid_url() {
        let err = MarketsClient::new("").build_markets_request().unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[test]
    fn non_http_scheme_is_invalid_url() {
        let err = MarketsClient::new("ftp://example.com")
            .build_markets_request()
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(msg) if msg.contains("ftp")));
    }

    #[test]
    fn parse_success_keeps_server_order() {
        let body = format!(
            "[{BITCOIN},{}]",
            r#"{"id":"ethereum","name":"Ethereum","symbol":"eth","image":"y","current_price":3000,"price_change_percentage_24h":-2.25}"#
        );
        let coins = client()
            .parse_markets_response(HttpResponse::new(200, body))
            .unwrap();
        let ids: Vec<_> = coins.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["bitcoin", "ethereum"]);
        assert_eq!(coins[1].price_change_percentage_24h, Some(-2.25));
    }

    #[test]
    fn parse_empty_array() {
        let coins = client()
            .parse_markets_response(HttpResponse::new(200, "[]"))
            .unwrap();
        assert!(coins.is_empty());
    }

    #[test]
    fn parse_non_200_is_server_error_even_with_valid_body() {
        for status in [201, 204, 301, 404, 429, 500, 503] {
            let err = client()
                .parse_markets_response(HttpResponse::new(status, format!("[{BITCOIN}]")))
                .unwrap_err();
            assert!(
                matches!(err, FetchError::ServerError { status: s } if s == status),
                "status {status}"
            );
        }
    }

    #[test]
    fn parse_object_body_is_invalid_data() {
        let err = client()
            .parse_markets_response(HttpResponse::new(200, r#"{"not":"an array"}"#))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidData(_)));
    }

    #[test]
    fn parse_element_missing_id_is_invalid_data() {
        let body = format!(
            "[{BITCOIN},{}]",
            r#"{"name":"Ethereum","symbol":"eth","image":"y","current_price":3000}"#
        );
        let err = client()
            .parse_markets_response(HttpResponse::new(200, body))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidData(_)));
    }

    #[test]
    fn parse_invalid_utf8_is_invalid_data() {
        let body = b"[{\"id\":\"bitcoin\",\"name\":\"Bit\xFFcoin\",\"symbol\":\"btc\",\"image\":\"x\",\"current_price\":1}]";
        let err = client()
            .parse_markets_response(HttpResponse::new(200, body.as_slice()))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidData(_)));
    }

    #[test]
    fn parse_non_200_ignores_undecodable_body() {
        let err = client()
            .parse_markets_response(HttpResponse::new(500, vec![0xFF, 0xFE]))
            .unwrap_err();
        assert!(matches!(err, FetchError::ServerError { status: 500 }));
    }

    #[test]
    fn parse_bad_json_is_invalid_data() {
        let err = client()
            .parse_markets_response(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidData(_)));
    }
}
