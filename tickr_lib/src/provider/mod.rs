//! Provider adapters: one per upstream, all producing [`QuoteRecord`]s.
//!
//! Adapters convert every network, status, and parsing problem into a
//! [`FetchError`] at their boundary. The aggregator decides what to try next.

mod coingecko;
mod coinmarketcap;
mod yahoo;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::record::QuoteRecord;

pub use coingecko::CoinGeckoProvider;
pub use coinmarketcap::{CoinMarketCapProvider, SYNTHETIC_HISTORY_POINTS};
pub use yahoo::{YahooCryptoProvider, YahooEquityProvider};

/// A source of canonical quote records.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Constant identifier such as `"YAHOO"`, used in logs and errors.
    fn id(&self) -> &'static str;

    /// Whether the provider has what it needs to run (credentials, etc.).
    /// Unconfigured providers are skipped without charging the rate limiter.
    fn is_configured(&self) -> bool {
        true
    }

    /// Fetches a quote for an already-validated, uppercase symbol.
    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError>;
}
