//! CoinGecko adapter, the primary crypto source.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tickr_api::CoinGeckoClient;

use super::QuoteProvider;
use crate::coin_ids::CoinIds;
use crate::error::FetchError;
use crate::record::{
    format_market_cap, percent_change, require_decimal, round_price, synthetic_spread, to_decimal,
    to_volume, AssetKind, QuoteRecord,
};

const PROVIDER_ID: &str = "COINGECKO";

/// Days of daily history requested from the market chart endpoint.
const HISTORY_DAYS: u32 = 365;

/// Quotes from the coin snapshot plus a year of daily prices.
///
/// Change is measured from the first price in the year-long series, not the
/// prior day's close, and `prev_close` reports that same earliest price.
pub struct CoinGeckoProvider {
    client: CoinGeckoClient,
    coin_ids: Arc<CoinIds>,
}

impl CoinGeckoProvider {
    pub fn new(client: CoinGeckoClient, coin_ids: Arc<CoinIds>) -> Self {
        Self { client, coin_ids }
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        let coin_id = self.coin_ids.coingecko_id(symbol);

        let coin = self
            .client
            .get_coin(&coin_id)
            .await
            .map_err(|e| FetchError::from_api(PROVIDER_ID, symbol, e))?;
        let chart = self
            .client
            .get_market_chart(&coin_id, "usd", HISTORY_DAYS)
            .await
            .map_err(|e| FetchError::from_api(PROVIDER_ID, symbol, e))?;

        let prices: Vec<f64> = chart
            .price_series()
            .into_iter()
            .filter(|p| p.is_finite())
            .collect();
        let (Some(&first_raw), Some(&current_raw)) = (prices.first(), prices.last()) else {
            return Err(FetchError::SymbolNotFound {
                provider: PROVIDER_ID,
                symbol: symbol.to_string(),
            });
        };

        let market = coin.market_data.unwrap_or_default();
        let current = require_decimal(PROVIDER_ID, "current", current_raw)?;
        let first = require_decimal(PROVIDER_ID, "first price", first_raw)?;
        let open = market
            .current_price_in("usd")
            .and_then(to_decimal)
            .unwrap_or(current);
        let high = prices.iter().copied().fold(f64::MIN, f64::max);
        let low = prices.iter().copied().fold(f64::MAX, f64::min);
        let (bid, ask) = synthetic_spread(current);

        Ok(QuoteRecord {
            symbol: symbol.to_uppercase(),
            current: round_price(current),
            open: round_price(open),
            prev_close: round_price(first),
            high: round_price(require_decimal(PROVIDER_ID, "high", high)?),
            low: round_price(require_decimal(PROVIDER_ID, "low", low)?),
            change: round_price(current - first),
            change_percent: percent_change(current, first),
            pe_ratio: None,
            market_cap: format_market_cap(market.market_cap_in("usd").unwrap_or(0.0)),
            volume: to_volume(market.total_volume_in("usd").unwrap_or(0.0)),
            avg_volume: None,
            bid,
            ask,
            data: prices.iter().copied().filter_map(to_decimal).collect(),
            kind: AssetKind::Crypto,
            last_updated: Utc::now(),
        })
    }
}
