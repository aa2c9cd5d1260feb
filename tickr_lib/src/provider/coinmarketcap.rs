//! CoinMarketCap adapter, the keyed secondary crypto source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tickr_api::CoinMarketCapClient;

use super::QuoteProvider;
use crate::coin_ids::CoinIds;
use crate::error::FetchError;
use crate::record::{
    format_market_cap, require_decimal, round_price, synthetic_spread, to_decimal, to_volume,
    AssetKind, QuoteRecord,
};

const PROVIDER_ID: &str = "COINMARKETCAP";

/// Length of the flat history series. The quotes endpoint has no history,
/// so the current price is repeated.
pub const SYNTHETIC_HISTORY_POINTS: usize = 30;

/// Quotes from the latest-quote endpoint. Requires an API key; without a
/// client the provider reports itself unconfigured and is skipped.
pub struct CoinMarketCapProvider {
    client: Option<CoinMarketCapClient>,
    coin_ids: Arc<CoinIds>,
}

impl CoinMarketCapProvider {
    pub fn new(client: Option<CoinMarketCapClient>, coin_ids: Arc<CoinIds>) -> Self {
        Self { client, coin_ids }
    }
}

#[async_trait]
impl QuoteProvider for CoinMarketCapProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::ProviderNotConfigured {
            provider: PROVIDER_ID,
        })?;
        let coin_id = self
            .coin_ids
            .coinmarketcap_id(symbol)
            .ok_or_else(|| FetchError::SymbolNotFound {
                provider: PROVIDER_ID,
                symbol: symbol.to_string(),
            })?;

        let quote = client
            .get_latest_quote(coin_id, "USD")
            .await
            .map_err(|e| FetchError::from_api(PROVIDER_ID, symbol, e))?
            .ok_or_else(|| FetchError::SymbolNotFound {
                provider: PROVIDER_ID,
                symbol: symbol.to_string(),
            })?;

        let price = quote.price.ok_or_else(|| FetchError::MalformedResponse {
            provider: PROVIDER_ID,
            message: format!("quote for {} has no price", symbol),
        })?;
        let current = require_decimal(PROVIDER_ID, "price", price)?;
        let or_current = |value: Option<f64>| value.and_then(to_decimal).unwrap_or(current);

        let change_percent = quote
            .percent_change_24h
            .and_then(to_decimal)
            .unwrap_or(Decimal::ZERO);
        let open = or_current(quote.open_24h);
        let (bid, ask) = synthetic_spread(current);

        Ok(QuoteRecord {
            symbol: symbol.to_uppercase(),
            current: round_price(current),
            open: round_price(open),
            prev_close: round_price(open),
            high: round_price(or_current(quote.high_24h)),
            low: round_price(or_current(quote.low_24h)),
            change: round_price(change_percent * current / Decimal::ONE_HUNDRED),
            change_percent: round_price(change_percent),
            pe_ratio: None,
            market_cap: format_market_cap(quote.market_cap.unwrap_or(0.0)),
            volume: to_volume(quote.volume_24h.unwrap_or(0.0)),
            avg_volume: None,
            bid,
            ask,
            data: vec![current; SYNTHETIC_HISTORY_POINTS],
            kind: AssetKind::Crypto,
            last_updated: Utc::now(),
        })
    }
}
