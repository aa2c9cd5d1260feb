//! Yahoo Finance adapters: the equity provider and the `<SYMBOL>-USD`
//! crypto fallback built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tickr_api::types::yahoo::{ChartResult, InstrumentQuote};
use tickr_api::YahooClient;

use super::QuoteProvider;
use crate::error::FetchError;
use crate::record::{
    format_market_cap, percent_change, require_decimal, round_price, to_decimal, to_volume,
    AssetKind, QuoteRecord, MARKET_CAP_PLACEHOLDER,
};

const EQUITY_ID: &str = "YAHOO";
const CRYPTO_ID: &str = "YAHOO_CRYPTO";

/// Daily bars with null entries dropped. Columns are filtered independently,
/// which is fine because only aggregates and last values are used.
#[derive(Debug, Default)]
struct Bars {
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
    previous_close: Option<f64>,
}

impl Bars {
    fn from_chart(chart: &ChartResult) -> Self {
        let Some(series) = chart.series() else {
            return Self::default();
        };
        let present = |col: &[Option<f64>]| -> Vec<f64> {
            col.iter().flatten().copied().filter(|v| v.is_finite()).collect()
        };
        Self {
            open: present(&series.open),
            high: present(&series.high),
            low: present(&series.low),
            close: present(&series.close),
            volume: present(&series.volume),
            previous_close: chart.meta.chart_previous_close.filter(|v| v.is_finite()),
        }
    }

    fn max_high(&self) -> Option<f64> {
        self.high.iter().copied().reduce(f64::max)
    }

    fn min_low(&self) -> Option<f64> {
        self.low.iter().copied().reduce(f64::min)
    }

    fn mean_volume(&self) -> Option<f64> {
        if self.volume.is_empty() {
            return None;
        }
        Some(self.volume.iter().sum::<f64>() / self.volume.len() as f64)
    }
}

/// Equity quotes from Yahoo: instrument metadata, one year of daily bars,
/// and today's bar for the latest price.
pub struct YahooEquityProvider {
    client: YahooClient,
}

impl YahooEquityProvider {
    pub fn new(client: YahooClient) -> Self {
        Self { client }
    }

    /// Metadata is best effort: Yahoo's quote endpoint is flakier than the
    /// chart endpoint, and every field it supplies has a history fallback.
    async fn metadata(&self, ticker: &str, provider: &'static str) -> InstrumentQuote {
        match self.client.get_quote(ticker).await {
            Ok(Some(quote)) => quote,
            Ok(None) => InstrumentQuote::default(),
            Err(e) => {
                tracing::warn!("{}: metadata unavailable for {}: {}", provider, ticker, e);
                InstrumentQuote::default()
            }
        }
    }

    async fn bars(
        &self,
        ticker: &str,
        range: &str,
        provider: &'static str,
    ) -> Result<Bars, FetchError> {
        let chart = self
            .client
            .get_chart(ticker, range, "1d")
            .await
            .map_err(|e| FetchError::from_api(provider, ticker, e))?;
        Ok(chart.as_ref().map(Bars::from_chart).unwrap_or_default())
    }

    /// Builds a record for `ticker`, attributing failures to `provider`.
    pub(crate) async fn fetch_ticker(
        &self,
        ticker: &str,
        provider: &'static str,
    ) -> Result<QuoteRecord, FetchError> {
        let info = self.metadata(ticker, provider).await;

        let history = self.bars(ticker, "1y", provider).await?;
        if history.close.is_empty() {
            tracing::warn!("{}: no data found for {} (may be delisted)", provider, ticker);
            return Err(FetchError::SymbolNotFound {
                provider,
                symbol: ticker.to_string(),
            });
        }

        let today = self.bars(ticker, "1d", provider).await?;
        let current_raw = *today
            .close
            .last()
            .ok_or_else(|| FetchError::MalformedResponse {
                provider,
                message: format!("no intraday price for {}", ticker),
            })?;
        let current = require_decimal(provider, "current", current_raw)?;

        let open_raw = today
            .open
            .last()
            .copied()
            .or(info.regular_market_open)
            .unwrap_or(current_raw);
        // The last yearly close is today's close during a session, so it is
        // only used when neither endpoint reports the prior close.
        let prev_close_raw = info
            .regular_market_previous_close
            .or(today.previous_close)
            .or_else(|| history.close.last().copied())
            .unwrap_or(current_raw);
        let open = require_decimal(provider, "open", open_raw)?;
        let prev_close = require_decimal(provider, "prev_close", prev_close_raw)?;

        let high = require_decimal(provider, "high", history.max_high().unwrap_or(current_raw))?;
        let low = require_decimal(provider, "low", history.min_low().unwrap_or(current_raw))?;

        let volume = info
            .regular_market_volume
            .or_else(|| history.volume.last().copied())
            .and_then(to_volume)
            .filter(|v| *v > 0);
        let avg_volume = info
            .average_volume
            .or_else(|| history.mean_volume())
            .and_then(to_volume)
            .filter(|v| *v > 0);

        let bid = quoted_or(info.bid, current, Decimal::new(999, 3));
        let ask = quoted_or(info.ask, current, Decimal::new(1001, 3));

        let change = current - prev_close;
        Ok(QuoteRecord {
            symbol: ticker.to_string(),
            current: round_price(current),
            open: round_price(open),
            prev_close: round_price(prev_close),
            high: round_price(high),
            low: round_price(low),
            change: round_price(change),
            change_percent: percent_change(current, prev_close),
            pe_ratio: info
                .trailing_pe
                .filter(|pe| *pe != 0.0)
                .and_then(to_decimal)
                .map(round_price),
            market_cap: info
                .market_cap
                .filter(|cap| *cap > 0.0)
                .map(format_market_cap)
                .unwrap_or_else(|| MARKET_CAP_PLACEHOLDER.to_string()),
            volume,
            avg_volume,
            bid,
            ask,
            data: history.close.iter().copied().filter_map(to_decimal).collect(),
            kind: AssetKind::Stock,
            last_updated: Utc::now(),
        })
    }
}

/// Uses a quoted bid/ask when Yahoo supplies a positive one; otherwise
/// synthesizes it as `current * factor`.
fn quoted_or(quoted: Option<f64>, current: Decimal, factor: Decimal) -> Decimal {
    quoted
        .filter(|v| *v > 0.0)
        .and_then(to_decimal)
        .map(round_price)
        .unwrap_or_else(|| round_price(current * factor))
}

#[async_trait]
impl QuoteProvider for YahooEquityProvider {
    fn id(&self) -> &'static str {
        EQUITY_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        self.fetch_ticker(symbol, EQUITY_ID).await
    }
}

/// Last-resort crypto source: the equity provider on `<SYMBOL>-USD`,
/// relabelled as a crypto quote for the bare symbol.
pub struct YahooCryptoProvider {
    equity: Arc<YahooEquityProvider>,
}

impl YahooCryptoProvider {
    pub fn new(equity: Arc<YahooEquityProvider>) -> Self {
        Self { equity }
    }
}

#[async_trait]
impl QuoteProvider for YahooCryptoProvider {
    fn id(&self) -> &'static str {
        CRYPTO_ID
    }

    async fn fetch(&self, symbol: &str) -> Result<QuoteRecord, FetchError> {
        let ticker = format!("{}-USD", symbol);
        let mut record = self.equity.fetch_ticker(&ticker, CRYPTO_ID).await?;
        record.kind = AssetKind::Crypto;
        record.symbol = symbol.to_uppercase();
        Ok(record)
    }
}
