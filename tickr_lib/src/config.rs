//! Runtime settings read from the environment.

use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::rate_limiter::DEFAULT_MIN_DELAY;

/// Default timeout applied to every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Value shipped in sample `.env` files; treated the same as no key.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Knobs for the cache, rate limiter and upstream clients.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_ttl: Duration,
    pub min_call_delay: Duration,
    pub request_timeout: Duration,
    pub coinmarketcap_api_key: Option<String>,
    pub yahoo_base_url: String,
    /// Host that hands out the cookie Yahoo's quote endpoint requires.
    pub yahoo_cookie_url: String,
    pub coingecko_base_url: String,
    pub coinmarketcap_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            min_call_delay: DEFAULT_MIN_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            coinmarketcap_api_key: None,
            yahoo_base_url: tickr_api::YAHOO_BASE_URL.to_string(),
            yahoo_cookie_url: tickr_api::YAHOO_COOKIE_URL.to_string(),
            coingecko_base_url: tickr_api::COINGECKO_BASE_URL.to_string(),
            coinmarketcap_base_url: tickr_api::COINMARKETCAP_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|val| val.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|val| val.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        Self {
            cache_ttl: secs("TICKR_CACHE_TTL_SECS", defaults.cache_ttl),
            min_call_delay: millis("TICKR_MIN_CALL_DELAY_MS", defaults.min_call_delay),
            request_timeout: secs("TICKR_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            coinmarketcap_api_key: usable_api_key(lookup("COINMARKETCAP_API_KEY")),
            yahoo_base_url: lookup("TICKR_YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            yahoo_cookie_url: lookup("TICKR_YAHOO_COOKIE_URL")
                .unwrap_or(defaults.yahoo_cookie_url),
            coingecko_base_url: lookup("TICKR_COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            coinmarketcap_base_url: lookup("TICKR_COINMARKETCAP_BASE_URL")
                .unwrap_or(defaults.coinmarketcap_base_url),
        }
    }
}

/// Drops blank and placeholder keys.
pub fn usable_api_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_API_KEY)
}
