//! Response types for the CoinMarketCap quotes endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Body of `GET /v1/cryptocurrency/quotes/latest`, keyed by the requested id.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct QuotesLatestResponse {
    #[serde(default)]
    pub data: HashMap<String, CmcAsset>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CmcAsset {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Quotes keyed by the `convert` currency, e.g. `"USD"`.
    #[serde(default)]
    pub quote: HashMap<String, CmcQuote>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CmcQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub open_24h: Option<f64>,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
}
