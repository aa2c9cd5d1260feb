//! Error types for quote fetching.

use thiserror::Error;

use crate::record::AssetKind;

/// Why a quote could not be produced.
///
/// Adapters return the first four kinds; the aggregator adds `NoDataFound`
/// when every provider in a chain has failed, and `InvalidSymbol` when the
/// input never reaches a provider.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure, timeout, or a non-success HTTP status.
    #[error("{provider} unavailable: {message}")]
    UpstreamUnavailable {
        provider: &'static str,
        message: String,
    },
    /// The provider answered but has no data for the symbol.
    #[error("{provider} has no data for {symbol}")]
    SymbolNotFound {
        provider: &'static str,
        symbol: String,
    },
    /// The response did not have the expected shape or values.
    #[error("{provider} returned a malformed response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
    /// The provider needs credentials that were not supplied.
    #[error("{provider} is not configured")]
    ProviderNotConfigured { provider: &'static str },
    /// Every applicable provider failed.
    #[error("No data found for {kind} symbol {symbol}")]
    NoDataFound { symbol: String, kind: AssetKind },
    /// User-provided symbol failed validation.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

impl FetchError {
    /// Converts a client error from `provider` into an adapter failure.
    /// A 404 means the upstream does not know `symbol`.
    pub fn from_api(provider: &'static str, symbol: &str, err: tickr_api::Error) -> Self {
        match err {
            e if e.is_not_found() => Self::SymbolNotFound {
                provider,
                symbol: symbol.to_string(),
            },
            tickr_api::Error::ParseFailed(message) => Self::MalformedResponse { provider, message },
            e => Self::UpstreamUnavailable {
                provider,
                message: e.to_string(),
            },
        }
    }

    /// The provider that produced this failure, if any.
    pub fn provider(&self) -> Option<&'static str> {
        match self {
            Self::UpstreamUnavailable { provider, .. }
            | Self::SymbolNotFound { provider, .. }
            | Self::MalformedResponse { provider, .. }
            | Self::ProviderNotConfigured { provider } => Some(provider),
            Self::NoDataFound { .. } | Self::InvalidSymbol(_) => None,
        }
    }
}
