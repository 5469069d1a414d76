//! HTTP byte-fetch transports.
//!
//! The fetch layer only needs "eventually get bytes or a typed failure". Two
//! calling conventions are supported: [`Transport`] blocks until the request
//! completes, [`AsyncTransport`] suspends. Both map responses identically:
//! unparseable URL → [`FetchError::InvalidUrl`] without issuing a request,
//! request failure → [`FetchError::Connection`], non-2xx status →
//! [`FetchError::Status`], successful status with an empty body →
//! [`FetchError::EmptyBody`].

use super::types::{FetchError, TransportConfig};
use bytes::Bytes;
use std::future::Future;
use tracing::{debug, trace, warn};

/// Trait for blocking byte-fetch operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock transports in tests. For use inside an async runtime,
/// prefer [`AsyncTransport`].
pub trait Transport: Send + Sync {
    /// Fetches the resource at `url` and returns its body bytes.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or a classified failure.
    fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Trait for asynchronous byte-fetch operations.
///
/// This is the calling convention consumed by
/// [`ImageClient`](crate::fetch::ImageClient).
pub trait AsyncTransport: Send + Sync {
    /// Fetches the resource at `url` and returns its body bytes.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or a classified failure.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

impl<T: AsyncTransport + ?Sized> AsyncTransport for std::sync::Arc<T> {
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Bytes, FetchError>> + Send {
        (**self).fetch_bytes(url)
    }
}

/// Blocking HTTP transport backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a new blocking HTTP transport.
    pub fn new(config: TransportConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| FetchError::Connection(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = parse_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| FetchError::Connection(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Connection(format!("failed to read response: {e}")))?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(bytes)
    }
}

/// Async HTTP transport backed by reqwest.
///
/// Uses non-blocking I/O and connection pooling; this is the transport the
/// default client composition uses.
#[derive(Clone)]
pub struct AsyncHttpTransport {
    client: reqwest::Client,
}

impl AsyncHttpTransport {
    /// Creates a new async HTTP transport.
    pub fn new(config: TransportConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                FetchError::Connection(format!("failed to create async HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }
}

impl AsyncTransport for AsyncHttpTransport {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = parse_url(url)?;
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(parsed).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Connection(format!("request failed: {e}")));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = url, status = status.as_u16(), "HTTP error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Connection(format!("failed to read response: {e}")))?;

        trace!(url = url, bytes = bytes.len(), "HTTP response body read");
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(bytes)
    }
}

/// Parses a URL string, classifying failures as [`FetchError::InvalidUrl`].
///
/// Parsing happens before any request is issued, so an invalid URL never
/// reaches the network.
fn parse_url(url: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_rejects_empty_string() {
        let result = parse_url("");
        assert_eq!(result.unwrap_err(), FetchError::InvalidUrl("".to_string()));
    }

    #[test]
    fn test_parse_url_rejects_relative_url() {
        assert!(parse_url("not a url").is_err());
    }

    #[test]
    fn test_parse_url_accepts_absolute_url() {
        assert!(parse_url("https://example.com/image.png").is_ok());
    }

    #[test]
    fn test_blocking_transport_invalid_url_skips_request() {
        let transport = HttpTransport::new(TransportConfig::default()).unwrap();
        let result = transport.fetch_bytes("");
        assert_eq!(result.unwrap_err(), FetchError::InvalidUrl("".to_string()));
    }

    #[tokio::test]
    async fn test_async_transport_invalid_url_skips_request() {
        let transport = AsyncHttpTransport::new(TransportConfig::default()).unwrap();
        let result = transport.fetch_bytes("").await;
        assert_eq!(result.unwrap_err(), FetchError::InvalidUrl("".to_string()));
    }
}
