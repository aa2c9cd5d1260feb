//! The canonical quote record every provider adapter produces, plus the
//! small numeric helpers the adapters share.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Placeholder shown when a provider does not report market cap.
pub const MARKET_CAP_PLACEHOLDER: &str = "--";

/// Instrument class. Selects the provider chain and prefixes the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Stock,
    Crypto,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Crypto => "crypto",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized quote shared by every provider.
///
/// Scalar prices are rounded to cents; `data` keeps provider precision and is
/// ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub current: Decimal,
    pub open: Decimal,
    pub prev_close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub pe_ratio: Option<Decimal>,
    pub market_cap: String,
    pub volume: Option<u64>,
    pub avg_volume: Option<u64>,
    pub bid: Decimal,
    pub ask: Decimal,
    pub data: Vec<Decimal>,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub last_updated: DateTime<Utc>,
}

impl QuoteRecord {
    /// Checks the invariants a record must hold before it is cached.
    ///
    /// An empty series means the provider had nothing for the symbol.
    pub fn validate(&self, provider: &'static str) -> Result<(), FetchError> {
        if self.data.is_empty() {
            return Err(FetchError::SymbolNotFound {
                provider,
                symbol: self.symbol.clone(),
            });
        }
        for (field, value) in [("current", self.current), ("high", self.high), ("low", self.low)] {
            if value < Decimal::ZERO {
                return Err(FetchError::MalformedResponse {
                    provider,
                    message: format!("{} is negative ({})", field, value),
                });
            }
        }
        if self.high < self.low {
            return Err(FetchError::MalformedResponse {
                provider,
                message: format!("high {} is below low {}", self.high, self.low),
            });
        }
        Ok(())
    }
}

/// Percent change from `base` to `current`, rounded to 2 dp.
/// A zero base yields 0 instead of dividing by zero.
pub fn percent_change(current: Decimal, base: Decimal) -> Decimal {
    if base.is_zero() {
        return Decimal::ZERO;
    }
    ((current - base) / base * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Rounds a price to cents.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Converts an upstream float, rejecting NaN and infinities.
pub fn to_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Like [`to_decimal`] but reports which field was unusable.
pub fn require_decimal(
    provider: &'static str,
    field: &str,
    value: f64,
) -> Result<Decimal, FetchError> {
    to_decimal(value).ok_or_else(|| FetchError::MalformedResponse {
        provider,
        message: format!("{} is not a finite number ({})", field, value),
    })
}

/// Bid/ask synthesized as 0.1% either side of `current`.
pub fn synthetic_spread(current: Decimal) -> (Decimal, Decimal) {
    let bid = current * Decimal::new(999, 3);
    let ask = current * Decimal::new(1001, 3);
    (round_price(bid), round_price(ask))
}

/// Formats a market cap in billions, e.g. `"12.34B"`.
pub fn format_market_cap(market_cap: f64) -> String {
    format!("{:.2}B", market_cap / 1e9)
}

/// Converts an upstream volume to a whole count; non-finite or negative
/// values are dropped.
pub fn to_volume(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 {
        Some(value as u64)
    } else {
        None
    }
}
