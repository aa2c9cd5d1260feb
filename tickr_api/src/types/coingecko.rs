//! Response types for the CoinGecko v3 API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /coins/{id}`. Only the market snapshot is kept.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CoinDetail {
    pub id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub market_data: Option<MarketData>,
}

/// Per-currency market snapshot. Values are keyed by lowercase currency code
/// and may be `null` for thinly traded pairs.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MarketData {
    #[serde(default)]
    pub current_price: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub market_cap: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub total_volume: HashMap<String, Option<f64>>,
}

impl MarketData {
    pub fn current_price_in(&self, currency: &str) -> Option<f64> {
        self.current_price.get(currency).copied().flatten()
    }

    pub fn market_cap_in(&self, currency: &str) -> Option<f64> {
        self.market_cap.get(currency).copied().flatten()
    }

    pub fn total_volume_in(&self, currency: &str) -> Option<f64> {
        self.total_volume.get(currency).copied().flatten()
    }
}

/// Body of `GET /coins/{id}/market_chart`: `[timestamp_ms, price]` pairs in
/// chronological order.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

impl MarketChart {
    /// Prices without timestamps, oldest first.
    pub fn price_series(&self) -> Vec<f64> {
        self.prices.iter().map(|(_, price)| *price).collect()
    }
}
