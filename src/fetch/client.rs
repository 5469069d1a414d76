//! Fetch coordination: transport, cache, and callback dispatch.

use super::handle::FetchHandle;
use crate::asset::{Asset, AssetDecoder, RawDecoder, ResourceId};
use crate::cache::AssetCache;
use crate::dispatch::Dispatcher;
use crate::transport::{AsyncHttpTransport, AsyncTransport, FetchError, TransportConfig};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Result delivered to a fetch callback.
pub type FetchResult = Result<Arc<Asset>, FetchError>;

/// Coordinates transport calls and the asset cache.
///
/// Construct one explicitly with injected dependencies; there is no ambient
/// shared instance. Clients are cheap to share behind an `Arc`, and two
/// clients built with [`with_cache`](Self::with_cache) can serve hits from
/// the same cache.
///
/// On a cache miss, [`fetch`](Self::fetch) spawns a task onto the current
/// tokio runtime, so it must be called from within one.
pub struct ImageClient<T: AsyncTransport> {
    transport: Arc<T>,
    cache: AssetCache,
    response_context: Option<Arc<dyn Dispatcher>>,
    decoder: Arc<dyn AssetDecoder>,
}

impl<T: AsyncTransport + 'static> ImageClient<T> {
    /// Creates a client over `transport`.
    ///
    /// # Arguments
    ///
    /// * `transport` - Byte-fetch capability
    /// * `response_context` - Context transport-path callbacks are marshaled
    ///   onto; `None` runs them inline on the completing task
    pub fn new(transport: T, response_context: Option<Arc<dyn Dispatcher>>) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: AssetCache::new(),
            response_context,
            decoder: Arc::new(RawDecoder),
        }
    }

    /// Replaces the decoder applied to fetched bytes.
    ///
    /// The default [`RawDecoder`] passes bytes through untouched; use
    /// [`ImageDecoder`](crate::asset::ImageDecoder) to decode encoded images
    /// to RGBA8.
    pub fn with_decoder(mut self, decoder: Arc<dyn AssetDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Replaces the asset cache, allowing several clients to share one.
    pub fn with_cache(mut self, cache: AssetCache) -> Self {
        self.cache = cache;
        self
    }

    /// Returns the client's asset cache.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Fetches the resource at `url` and delivers the result to `callback`.
    ///
    /// On a cache hit the callback runs synchronously on the calling thread
    /// with the cached asset, and no handle is returned (there is nothing to
    /// cancel). On a miss a transport call is issued; its completion -
    /// success or failure - is marshaled onto the response context. Failures
    /// are passed through verbatim with no retries, and a failed fetch never
    /// touches the cache.
    ///
    /// The callback fires exactly once, unless the returned handle is
    /// canceled before the transport call completes - then it never fires at
    /// all.
    ///
    /// Concurrent fetches for the same URL are not de-duplicated; each miss
    /// issues its own transport call, and the first successful completion
    /// populates the cache for everyone after it.
    pub fn fetch(
        &self,
        url: &str,
        callback: impl FnOnce(FetchResult) + Send + 'static,
    ) -> Option<FetchHandle> {
        let id = ResourceId::new(url);

        if let Some(asset) = self.cache.lookup(&id) {
            trace!(url = url, "cache hit");
            callback(Ok(asset));
            return None;
        }

        let handle = FetchHandle::new();
        let token = handle.token();
        let completion = handle.clone();
        let transport = Arc::clone(&self.transport);
        let decoder = Arc::clone(&self.decoder);
        let cache = self.cache.clone();
        let context = self.response_context.clone();
        let url = url.to_string();

        tokio::spawn(async move {
            let fetched = tokio::select! {
                _ = token.cancelled() => {
                    trace!(url = url, "fetch canceled before completion");
                    return;
                }
                result = transport.fetch_bytes(&url) => result,
            };

            let outcome = match fetched {
                Ok(bytes) => match decoder.decode(bytes) {
                    Ok(asset) => {
                        let asset = cache.store(id, Arc::new(asset));
                        debug!(url = url, bytes = asset.len(), "asset cached");
                        Ok(asset)
                    }
                    Err(e) => {
                        warn!(url = url, error = %e, "decode failed");
                        Err(e)
                    }
                },
                Err(e) => {
                    warn!(url = url, error = %e, "fetch failed");
                    Err(e)
                }
            };

            // Cancellation that lost the race to the transport call lands
            // here; the completion wins and the callback still fires.
            if !completion.try_complete() {
                trace!(url = url, "completion suppressed after cancel");
                return;
            }

            match context {
                Some(ctx) => ctx.dispatch(Box::new(move || callback(outcome))),
                None => callback(outcome),
            }
        });

        Some(handle)
    }
}

impl ImageClient<AsyncHttpTransport> {
    /// Creates a client over a default-configured HTTP transport with inline
    /// callback delivery.
    ///
    /// Convenience for application composition roots; library code should
    /// construct clients with explicit dependencies via [`new`](Self::new).
    pub fn with_defaults() -> Result<Self, FetchError> {
        Ok(Self::new(
            AsyncHttpTransport::new(TransportConfig::default())?,
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::StaticTransport;
    use std::time::Duration;
    use tokio::sync::oneshot;

    async fn fetch_and_wait(
        client: &ImageClient<StaticTransport>,
        url: &str,
    ) -> (Option<FetchHandle>, FetchResult) {
        let (tx, rx) = oneshot::channel();
        let handle = client.fetch(url, move |result| {
            let _ = tx.send(result);
        });
        let result = tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("callback never fired")
            .expect("callback dropped");
        (handle, result)
    }

    #[tokio::test]
    async fn test_fetch_miss_returns_handle_and_asset() {
        let client = ImageClient::new(StaticTransport::ok(vec![0, 1, 0, 1]), None);

        let (handle, result) = fetch_and_wait(&client, "https://www.apple.com").await;

        assert!(handle.is_some());
        assert_eq!(result.unwrap().as_bytes(), &[0, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_fetch_hit_is_synchronous_with_no_handle() {
        let client = ImageClient::new(StaticTransport::ok(vec![1, 2]), None);
        let (_, _) = fetch_and_wait(&client, "https://example.com/a").await;

        // Second fetch: served from cache, synchronously, with no handle.
        let mut delivered = None;
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = client.fetch("https://example.com/a", move |result| {
            let _ = tx.send(result);
        });
        if let Ok(result) = rx.try_recv() {
            delivered = Some(result);
        }

        assert!(handle.is_none());
        assert_eq!(delivered.unwrap().unwrap().as_bytes(), &[1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_failure_passes_error_through() {
        let client = ImageClient::new(StaticTransport::err(FetchError::Status(503)), None);

        let (handle, result) = fetch_and_wait(&client, "https://example.com/a").await;

        assert!(handle.is_some());
        assert_eq!(result.unwrap_err(), FetchError::Status(503));
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_populate_cache() {
        let client = ImageClient::new(StaticTransport::err(FetchError::EmptyBody), None);

        let (_, result) = fetch_and_wait(&client, "https://example.com/a").await;

        assert_eq!(result.unwrap_err(), FetchError::EmptyBody);
        assert!(!client
            .cache()
            .contains(&ResourceId::new("https://example.com/a")));
    }

    #[tokio::test]
    async fn test_fetch_decode_failure_reported_not_cached() {
        let client = ImageClient::new(StaticTransport::ok(vec![0, 1, 0, 1]), None)
            .with_decoder(Arc::new(crate::asset::ImageDecoder));

        let (_, result) = fetch_and_wait(&client, "https://example.com/a").await;

        assert!(matches!(result, Err(FetchError::Decode(_))));
        assert_eq!(client.cache().entry_count(), 0);
    }

    #[tokio::test]
    async fn test_shared_cache_across_clients() {
        let cache = AssetCache::new();
        let first =
            ImageClient::new(StaticTransport::ok(vec![42]), None).with_cache(cache.clone());
        let (_, result) = fetch_and_wait(&first, "https://example.com/shared").await;
        assert!(result.is_ok());

        // Second client with a failing transport still sees the cached asset.
        let second = ImageClient::new(StaticTransport::err(FetchError::Status(500)), None)
            .with_cache(cache);
        let (handle, result) = fetch_and_wait(&second, "https://example.com/shared").await;
        assert!(handle.is_none());
        assert_eq!(result.unwrap().as_bytes(), &[42]);
    }
}
