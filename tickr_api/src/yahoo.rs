//! Yahoo Finance chart and quote client.
//!
//! The chart endpoint is open. The quote endpoint needs a session: a cookie
//! from the cookie host plus a crumb bound to it. The session is fetched on
//! first use, reused, and dropped when Yahoo answers 401.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::http::{encode_segment, HttpClient};
use crate::types::yahoo::{ChartResponse, ChartResult, InstrumentQuote, QuoteResponse};
use crate::{Error, RequestGate, YAHOO_BASE_URL, YAHOO_COOKIE_URL};

#[derive(Debug, Clone)]
struct Session {
    cookie: String,
    crumb: String,
}

/// Client for the Yahoo Finance chart and quote endpoints.
pub struct YahooClient {
    http: HttpClient,
    cookie_url: String,
    session: RwLock<Option<Session>>,
}

impl YahooClient {
    /// Creates a client pointing at the production Yahoo Finance hosts.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        Self::with_urls(YAHOO_BASE_URL, YAHOO_COOKIE_URL, timeout)
    }

    /// Creates a client with a custom base URL that also serves the session
    /// cookie from its root. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let cookie_url = format!("{}/", base_url.trim_end_matches('/'));
        Self::with_urls(base_url, &cookie_url, timeout)
    }

    pub fn with_urls(base_url: &str, cookie_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(base_url, timeout)?,
            cookie_url: cookie_url.to_string(),
            session: RwLock::new(None),
        })
    }

    /// Makes every request from this client wait on `gate` first.
    pub fn with_gate(mut self, gate: Arc<dyn RequestGate>) -> Self {
        self.http.set_gate(gate);
        self
    }

    /// Fetches OHLCV bars for `ticker`.
    ///
    /// `range` and `interval` are passed through as Yahoo expects them
    /// (`"1y"`/`"1d"`). Returns `Ok(None)` when Yahoo answers 200 with an
    /// empty result set.
    pub async fn get_chart(
        &self,
        ticker: &str,
        range: &str,
        interval: &str,
    ) -> Result<Option<ChartResult>, Error> {
        let path = format!("/v8/finance/chart/{}", encode_segment(ticker));
        let resp: ChartResponse = self
            .http
            .get_json(
                &path,
                &[
                    ("range", range),
                    ("interval", interval),
                    ("includePrePost", "false"),
                ],
                &[],
            )
            .await?;

        if let Some(err) = &resp.chart.error {
            tracing::debug!("Yahoo chart error for {}: {}", ticker, err.code);
        }
        Ok(resp.chart.result.and_then(|r| r.into_iter().next()))
    }

    /// Fetches instrument metadata (previous close, volume, market cap, bid/ask).
    /// Returns `Ok(None)` when the symbol is absent from the result list.
    pub async fn get_quote(&self, ticker: &str) -> Result<Option<InstrumentQuote>, Error> {
        let session = self.session().await?;
        let result = self
            .http
            .get_json::<QuoteResponse>(
                "/v7/finance/quote",
                &[("symbols", ticker), ("crumb", session.crumb.as_str())],
                &[("cookie", session.cookie.as_str())],
            )
            .await;

        let resp = match result {
            Err(e @ Error::HttpStatus { status: 401, .. }) => {
                tracing::debug!("Yahoo rejected the session, clearing crumb");
                self.clear_session();
                return Err(e);
            }
            other => other?,
        };
        Ok(resp
            .quote_response
            .result
            .into_iter()
            .find(|q| q.symbol.eq_ignore_ascii_case(ticker)))
    }

    async fn session(&self) -> Result<Session, Error> {
        if let Some(session) = self.cached_session() {
            return Ok(session);
        }

        let cookie = self.http.fetch_cookie(&self.cookie_url).await?.ok_or_else(|| {
            Error::RequestFailed("Yahoo did not set a session cookie".to_string())
        })?;
        let crumb = self
            .http
            .get_text("/v1/test/getcrumb", &[], &[("cookie", cookie.as_str())])
            .await?
            .trim()
            .to_string();
        if crumb.is_empty() {
            return Err(Error::ParseFailed("empty Yahoo crumb".to_string()));
        }

        let session = Session { cookie, crumb };
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(session)
    }

    fn cached_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn clear_session(&self) {
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
