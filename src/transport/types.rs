//! Transport error taxonomy and configuration.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by transports and the fetch pipeline.
///
/// Transports report everything except [`FetchError::Decode`], which is
/// produced when response bytes cannot be decoded into an asset. The fetch
/// layer passes all of these through verbatim without retry or
/// reclassification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The URL string could not be parsed. No request is attempted.
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    /// The request could not be completed (connect, timeout, I/O).
    #[error("connection failed: {0}")]
    Connection(String),

    /// The server responded with a non-success status code.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The server responded successfully but the body was empty.
    #[error("response body was empty")]
    EmptyBody,

    /// Response bytes could not be decoded into an asset.
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Default per-request timeout, matching the original client configuration.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default User-Agent string for HTTP requests.
///
/// Some image hosts reject requests without a User-Agent header.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// HTTP transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout (default: 20 seconds)
    pub timeout: Duration,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
