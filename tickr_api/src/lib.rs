//! Thin HTTP clients for the upstream quote providers.
//!
//! Each client maps one REST API onto typed responses. Caching and fallback
//! between providers live one layer up in `tickr_lib`, which also supplies
//! the [`RequestGate`] that paces every request.

mod coingecko;
mod coinmarketcap;
mod errors;
mod gate;
mod http;
pub mod types;
mod yahoo;

pub use self::coingecko::CoinGeckoClient;
pub use self::coinmarketcap::CoinMarketCapClient;
pub use self::errors::Error;
pub use self::gate::RequestGate;
pub use self::yahoo::YahooClient;

/// Default base URL for the Yahoo Finance chart and quote endpoints.
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Host that hands out the session cookie needed for Yahoo's quote endpoint.
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

/// Default base URL for the public CoinGecko v3 API.
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Default base URL for the CoinMarketCap pro API.
pub const COINMARKETCAP_BASE_URL: &str = "https://pro-api.coinmarketcap.com";
