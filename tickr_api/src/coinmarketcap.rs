//! CoinMarketCap pro API client.

use std::sync::Arc;
use std::time::Duration;

use crate::http::HttpClient;
use crate::types::coinmarketcap::{CmcQuote, QuotesLatestResponse};
use crate::{Error, RequestGate, COINMARKETCAP_BASE_URL};

/// Header carrying the CoinMarketCap API key.
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Client for the keyed CoinMarketCap quotes endpoint.
pub struct CoinMarketCapClient {
    http: HttpClient,
    api_key: String,
}

impl CoinMarketCapClient {
    /// Creates a client pointing at the production pro API.
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, Error> {
        Self::with_base_url(COINMARKETCAP_BASE_URL, api_key, timeout)
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
            api_key,
        })
    }

    /// Makes every request from this client wait on `gate` first.
    pub fn with_gate(mut self, gate: Arc<dyn RequestGate>) -> Self {
        self.http.set_gate(gate);
        self
    }

    /// Fetches the latest quote for a numeric CoinMarketCap id.
    ///
    /// Returns `Ok(None)` if the id or the `convert` currency is missing
    /// from the response.
    pub async fn get_latest_quote(
        &self,
        coin_id: &str,
        convert: &str,
    ) -> Result<Option<CmcQuote>, Error> {
        let resp: QuotesLatestResponse = self
            .http
            .get_json(
                "/v1/cryptocurrency/quotes/latest",
                &[("id", coin_id), ("convert", convert)],
                &[(API_KEY_HEADER, self.api_key.as_str())],
            )
            .await?;

        Ok(resp
            .data
            .get(coin_id)
            .and_then(|asset| asset.quote.get(convert))
            .cloned())
    }
}
