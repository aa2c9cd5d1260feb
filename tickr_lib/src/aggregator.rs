//! The single entry point callers use: cache lookup, rate-limited provider
//! attempts, and the crypto fallback chain.

use std::sync::Arc;

use tickr_api::{CoinGeckoClient, CoinMarketCapClient, RequestGate, YahooClient};

use crate::cache::{cache_key, QuoteCache};
use crate::coin_ids::CoinIds;
use crate::config::Settings;
use crate::error::FetchError;
use crate::provider::{
    CoinGeckoProvider, CoinMarketCapProvider, QuoteProvider, YahooCryptoProvider,
    YahooEquityProvider,
};
use crate::rate_limiter::RateLimiter;
use crate::record::{AssetKind, QuoteRecord};
use crate::validation::validate_symbol;

/// Produces quote records from the cache or the providers.
///
/// Stocks go to the equity provider only. Crypto walks `crypto_chain` in
/// order and returns the first success. The shared rate limiter gates each
/// outbound HTTP request the providers make; cache hits, unconfigured
/// providers and unmapped symbols never reach it.
pub struct QuoteAggregator {
    equity: Arc<dyn QuoteProvider>,
    crypto_chain: Vec<Arc<dyn QuoteProvider>>,
    cache: Arc<QuoteCache>,
    limiter: Arc<RateLimiter>,
}

impl QuoteAggregator {
    pub fn new(
        equity: Arc<dyn QuoteProvider>,
        crypto_chain: Vec<Arc<dyn QuoteProvider>>,
        cache: Arc<QuoteCache>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            equity,
            crypto_chain,
            cache,
            limiter,
        }
    }

    /// Wires the real providers from `settings`: Yahoo for stocks, and
    /// CoinGecko, CoinMarketCap, Yahoo `-USD` pairs for crypto, in that order.
    /// CoinMarketCap only participates when an API key is configured.
    /// Every client is gated on one shared limiter.
    pub fn from_settings(settings: &Settings, coin_ids: CoinIds) -> Result<Self, tickr_api::Error> {
        let timeout = settings.request_timeout;
        let coin_ids = Arc::new(coin_ids);
        let limiter = Arc::new(RateLimiter::new(settings.min_call_delay));
        let gate = || Arc::clone(&limiter) as Arc<dyn RequestGate>;

        let yahoo = Arc::new(YahooEquityProvider::new(
            YahooClient::with_urls(&settings.yahoo_base_url, &settings.yahoo_cookie_url, timeout)?
                .with_gate(gate()),
        ));
        let coingecko = CoinGeckoProvider::new(
            CoinGeckoClient::with_base_url(&settings.coingecko_base_url, timeout)?.with_gate(gate()),
            Arc::clone(&coin_ids),
        );
        let coinmarketcap_client = match &settings.coinmarketcap_api_key {
            Some(key) => Some(
                CoinMarketCapClient::with_base_url(
                    &settings.coinmarketcap_base_url,
                    key.clone(),
                    timeout,
                )?
                .with_gate(gate()),
            ),
            None => None,
        };
        let coinmarketcap = CoinMarketCapProvider::new(coinmarketcap_client, coin_ids);
        let yahoo_crypto = YahooCryptoProvider::new(Arc::clone(&yahoo));

        Ok(Self::new(
            yahoo,
            vec![
                Arc::new(coingecko),
                Arc::new(coinmarketcap),
                Arc::new(yahoo_crypto),
            ],
            Arc::new(QuoteCache::new(settings.cache_ttl)),
            limiter,
        ))
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns a quote for `symbol`.
    ///
    /// A fresh cache entry is returned as-is unless `force_refresh` is set.
    /// Stock failures come back with the provider's error; crypto failures
    /// are collapsed into [`FetchError::NoDataFound`] once every provider in
    /// the chain has been tried. Failures never touch the cache.
    pub async fn get_quote(
        &self,
        symbol: &str,
        kind: AssetKind,
        force_refresh: bool,
    ) -> Result<QuoteRecord, FetchError> {
        let symbol = validate_symbol(symbol)?;
        let key = cache_key(kind, &symbol);

        if !force_refresh {
            if let Some(record) = self.cache.get(&key) {
                tracing::debug!("Cache hit for {}", key);
                return Ok(record);
            }
        }

        let record = match kind {
            AssetKind::Stock => self.attempt(self.equity.as_ref(), &symbol).await?,
            AssetKind::Crypto => self.first_crypto_success(&symbol).await?,
        };

        self.cache.set(key, record.clone());
        Ok(record)
    }

    async fn first_crypto_success(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        for provider in &self.crypto_chain {
            if !provider.is_configured() {
                tracing::debug!("Skipping {}: not configured", provider.id());
                continue;
            }
            match self.attempt(provider.as_ref(), symbol).await {
                Ok(record) => return Ok(record),
                Err(e) => tracing::warn!("{} failed for {}: {}", provider.id(), symbol, e),
            }
        }

        tracing::warn!("All crypto providers failed for {}", symbol);
        Err(FetchError::NoDataFound {
            symbol: symbol.to_string(),
            kind: AssetKind::Crypto,
        })
    }

    /// One provider call whose result must pass validation.
    async fn attempt(
        &self,
        provider: &dyn QuoteProvider,
        symbol: &str,
    ) -> Result<QuoteRecord, FetchError> {
        let record = provider.fetch(symbol).await?;
        record.validate(provider.id())?;
        tracing::info!(
            "{} returned {} at {}",
            provider.id(),
            record.symbol,
            record.current
        );
        Ok(record)
    }
}
