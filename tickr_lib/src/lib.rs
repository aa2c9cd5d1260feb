//! Library layer for tickr: canonical quote records, a TTL cache, a shared
//! rate limiter, provider adapters and the fallback aggregator.
//!
//! Wraps the raw `tickr_api` clients so callers only ever see one
//! operation, [`QuoteAggregator::get_quote`], and one record shape,
//! [`QuoteRecord`].

pub mod aggregator;
pub mod cache;
pub mod coin_ids;
pub mod config;
pub mod error;
pub mod provider;
pub mod rate_limiter;
pub mod record;
pub mod validation;

pub use tickr_api;

pub use aggregator::QuoteAggregator;
pub use cache::QuoteCache;
pub use coin_ids::{CoinIdError, CoinIds};
pub use config::Settings;
pub use error::FetchError;
pub use provider::QuoteProvider;
pub use rate_limiter::RateLimiter;
pub use record::{AssetKind, QuoteRecord};
