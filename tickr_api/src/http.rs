//! Shared GET-and-decode helper used by every upstream client.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{Error, RequestGate};

/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// A `reqwest::Client` bound to one base URL with a fixed request timeout.
/// When a gate is set, every request waits on it before being sent.
pub(crate) struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    gate: Option<Arc<dyn RequestGate>>,
}

impl HttpClient {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed(e.to_string())
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            gate: None,
        })
    }

    pub(crate) fn set_gate(&mut self, gate: Arc<dyn RequestGate>) {
        self.gate = Some(gate);
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        request.send().await.map_err(classify)
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", self.base_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(e.to_string())
        })
    }

    /// Sends a GET and decodes a JSON body. Non-2xx statuses become
    /// `Error::HttpStatus` with a truncated body snippet.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<T, Error> {
        let body = self.get_text(path, query, headers).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::debug!("Failed to parse {}: {} | body: {}", path, e, snippet);
            Error::ParseFailed(format!("{} | body: {}", e, snippet))
        })
    }

    /// Sends a GET and returns the body of a 2xx response as text.
    pub(crate) async fn get_text(
        &self,
        path: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<String, Error> {
        let url = self.get_url(path)?;
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let resp = self.send(request).await?;
        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("GET {} returned {}: {}", path, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }
        Ok(body)
    }

    /// GETs an absolute URL and returns the `name=value` part of its first
    /// `Set-Cookie` header. The status is ignored: cookie hosts often answer
    /// 404 while still setting the cookie.
    pub(crate) async fn fetch_cookie(&self, url: &str) -> Result<Option<String>, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let resp = self.send(self.client.get(url)).await?;
        Ok(resp
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.split_once(';').map_or(s, |(pair, _)| pair).trim().to_string())
            .filter(|pair| !pair.is_empty()))
    }
}

fn classify(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::RequestFailed(e.to_string())
    }
}

/// Percent-encodes a value for use as a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...[truncated]", &body[..idx]),
        None => body.to_string(),
    }
}
