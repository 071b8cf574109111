//! Market-data DTOs for the coin markets endpoint.
//!
//! # Design
//! `CoinRecord` mirrors one element of the `/markets` JSON array. Only the
//! fields the list view needs are decoded; serde ignores the rest of the
//! (much larger) upstream object. Records are never mutated after decoding:
//! a successful fetch replaces the whole list.

use serde::{Deserialize, Serialize};

/// A single market-data entry for one cryptocurrency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoinRecord {
    /// Upstream identifier, unique within one response (e.g. `"bitcoin"`).
    pub id: String,
    pub name: String,
    pub symbol: String,
    /// URL of the coin's logo.
    pub image: String,
    /// Price in the quoted currency (USD).
    pub current_price: f64,
    /// 24h change in percent. The endpoint omits or nulls it for some coins.
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinRecord {
    /// Ticker symbol as shown in list rows.
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}
