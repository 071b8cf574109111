//! Runtime configuration for the fetch stack.
//!
//! The library never reads the environment on its own. Binaries call
//! [`FetchConfig::from_env`], which loads a `.env` file if present and then
//! reads:
//!
//! - `COIN_MARKETS_BASE_URL`: markets endpoint base (default: CoinGecko v3 coins)
//! - `COIN_FETCH_TIMEOUT_SECS`: request timeout in seconds (default: client default)
//! - `COIN_CLEAR_ERROR_ON_SUCCESS`: `true` / `false` (default: false)
//! - `COIN_SUPERSEDE_IN_FLIGHT`: `true` / `false` (default: false)

use std::time::Duration;

use thiserror::Error;

use crate::client::{MarketsClient, DEFAULT_BASE_URL};
use crate::service::FetchService;
use crate::state::RefreshPolicy;
use crate::transport::ReqwestTransport;

pub const ENV_BASE_URL: &str = "COIN_MARKETS_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "COIN_FETCH_TIMEOUT_SECS";
pub const ENV_CLEAR_ERROR_ON_SUCCESS: &str = "COIN_CLEAR_ERROR_ON_SUCCESS";
pub const ENV_SUPERSEDE_IN_FLIGHT: &str = "COIN_SUPERSEDE_IN_FLIGHT";

const DEFAULT_USER_AGENT: &str = concat!("coin-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}` ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_url: String,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub policy: RefreshPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            policy: RefreshPolicy::default(),
        }
    }
}

impl FetchConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup(ENV_CLEAR_ERROR_ON_SUCCESS) {
            config.policy.clear_error_on_success = parse_bool(ENV_CLEAR_ERROR_ON_SUCCESS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SUPERSEDE_IN_FLIGHT) {
            config.policy.supersede_in_flight = parse_bool(ENV_SUPERSEDE_IN_FLIGHT, &raw)?;
        }

        Ok(config)
    }

    /// Wire up a reqwest-backed `FetchService` for this config.
    pub fn build_service(&self) -> Result<FetchService<ReqwestTransport>, ConfigError> {
        let transport = ReqwestTransport::new(self.timeout, &self.user_agent)?;
        Ok(FetchService::new(MarketsClient::new(&self.base_url), transport))
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
