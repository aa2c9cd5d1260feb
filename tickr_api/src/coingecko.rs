//! CoinGecko public API client.

use std::sync::Arc;
use std::time::Duration;

use crate::http::{encode_segment, HttpClient};
use crate::types::coingecko::{CoinDetail, MarketChart};
use crate::{Error, RequestGate, COINGECKO_BASE_URL};

/// Client for the keyless CoinGecko v3 endpoints.
pub struct CoinGeckoClient {
    http: HttpClient,
}

impl CoinGeckoClient {
    /// Creates a client pointing at the public CoinGecko API.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        Self::with_base_url(COINGECKO_BASE_URL, timeout)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
        })
    }

    /// Makes every request from this client wait on `gate` first.
    pub fn with_gate(mut self, gate: Arc<dyn RequestGate>) -> Self {
        self.http.set_gate(gate);
        self
    }

    /// Fetches the coin snapshot (`market_data`) by CoinGecko id, e.g. `"bitcoin"`.
    pub async fn get_coin(&self, coin_id: &str) -> Result<CoinDetail, Error> {
        let path = format!("/coins/{}", encode_segment(coin_id));
        self.http
            .get_json(
                &path,
                &[
                    ("localization", "false"),
                    ("tickers", "false"),
                    ("community_data", "false"),
                    ("developer_data", "false"),
                ],
                &[],
            )
            .await
    }

    /// Fetches the daily price series for the last `days` days.
    pub async fn get_market_chart(
        &self,
        coin_id: &str,
        vs_currency: &str,
        days: u32,
    ) -> Result<MarketChart, Error> {
        let path = format!("/coins/{}/market_chart", encode_segment(coin_id));
        let days = days.to_string();
        self.http
            .get_json(
                &path,
                &[("vs_currency", vs_currency), ("days", days.as_str())],
                &[],
            )
            .await
    }
}
