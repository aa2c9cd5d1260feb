//! Error types for the upstream clients.

/// Errors that can occur when calling an upstream API.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request did not complete within the client timeout.
    #[error("Request timed out")]
    Timeout,
    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The body was not the JSON shape we expected.
    #[error("Failed to parse response: {0}")]
    ParseFailed(String),
    /// The configured base URL plus path did not form a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// True when the upstream answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404, .. })
    }
}
