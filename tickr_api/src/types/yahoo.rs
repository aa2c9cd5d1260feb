//! Response types for the Yahoo Finance chart and quote endpoints.

use serde::{Deserialize, Serialize};

/// Top-level body of `/v8/finance/chart/{ticker}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error object Yahoo embeds in chart and quote responses.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub regular_market_price: Option<f64>,
    #[serde(default)]
    pub chart_previous_close: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<OhlcvSeries>,
}

/// Parallel OHLCV arrays. Yahoo emits `null` for bars without trades.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OhlcvSeries {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

impl ChartResult {
    /// The first (and in practice only) OHLCV block.
    pub fn series(&self) -> Option<&OhlcvSeries> {
        self.indicators.quote.first()
    }
}

/// Top-level body of `/v7/finance/quote?symbols=...`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    pub quote_response: QuoteEnvelope,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuoteEnvelope {
    #[serde(default)]
    pub result: Vec<InstrumentQuote>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Instrument metadata. Every numeric field is optional: Yahoo omits fields
/// that do not apply (no P/E for ETFs, no bid/ask outside market hours).
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct InstrumentQuote {
    pub symbol: String,
    #[serde(rename = "regularMarketOpen", default)]
    pub regular_market_open: Option<f64>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    pub regular_market_previous_close: Option<f64>,
    #[serde(rename = "regularMarketVolume", default)]
    pub regular_market_volume: Option<f64>,
    #[serde(rename = "averageDailyVolume3Month", default)]
    pub average_volume: Option<f64>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE", default)]
    pub trailing_pe: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
}
