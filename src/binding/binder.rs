//! Binding fetch results to display targets.

use super::target::{DisplayTarget, TargetId};
use crate::asset::Asset;
use crate::fetch::{FetchHandle, ImageClient};
use crate::transport::{AsyncTransport, FetchError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Sink for failures swallowed at the binding boundary.
///
/// The binder never surfaces fetch failures to the caller of
/// [`ImageBinder::bind`]; they are reported here instead.
pub trait FailureSink: Send + Sync {
    /// Reports a swallowed failure.
    ///
    /// # Arguments
    ///
    /// * `context` - The URL whose fetch failed
    /// * `error` - The failure as the fetch layer reported it
    fn failure(&self, context: &str, error: &FetchError);
}

/// Default failure sink: logs via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn failure(&self, context: &str, error: &FetchError) {
        warn!(url = context, error = %error, "image bind failed");
    }
}

/// One registered binding: the fetch a target is currently waiting on.
struct BindingEntry {
    /// Monotonic per-binder sequence; completion callbacks compare against
    /// it to detect that they have been superseded.
    generation: u64,
    /// Handle for the in-flight fetch, once known. `None` only in the window
    /// between registration and the fetch call returning.
    handle: Option<FetchHandle>,
}

type Registry = Mutex<HashMap<TargetId, BindingEntry>>;

/// Binds fetch results to display targets with cancel-on-replace semantics.
///
/// Each target holds at most one outstanding fetch: binding a new URL
/// cancels whatever the target was previously waiting on, shows the
/// placeholder immediately, and applies the fetched asset only if the
/// binding has not been superseded by the time it completes. For a given
/// target, only the most recently bound fetch's result can ever reach the
/// visible content.
///
/// The binder may be torn down while fetches are outstanding: completion
/// callbacks hold the registry and a liveness flag, not the binder, and
/// become no-ops after [`shutdown`](Self::shutdown) or drop.
pub struct ImageBinder<T: AsyncTransport> {
    client: ImageClient<T>,
    registry: Arc<Registry>,
    alive: Arc<AtomicBool>,
    generation: AtomicU64,
    failures: Arc<dyn FailureSink>,
}

impl<T: AsyncTransport> ImageBinder<T> {
    /// Creates a binder over `client`, logging swallowed failures via
    /// [`TracingSink`].
    pub fn new(client: ImageClient<T>) -> Self {
        Self {
            client,
            registry: Arc::new(Mutex::new(HashMap::new())),
            alive: Arc::new(AtomicBool::new(true)),
            generation: AtomicU64::new(0),
            failures: Arc::new(TracingSink),
        }
    }

    /// Replaces the failure sink.
    pub fn with_failure_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.failures = sink;
        self
    }

    /// Returns the underlying fetch client.
    pub fn client(&self) -> &ImageClient<T> {
        &self.client
    }

    /// Returns how many targets currently have an outstanding fetch.
    pub fn outstanding(&self) -> usize {
        self.registry.lock().unwrap().len()
    }

    /// Tears the binder down: cancels all outstanding fetches and turns any
    /// late completion callbacks into no-ops.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Release);
        let mut registry = self.registry.lock().unwrap();
        for (_, entry) in registry.drain() {
            if let Some(handle) = entry.handle {
                handle.cancel();
            }
        }
    }
}

impl<T: AsyncTransport + 'static> ImageBinder<T> {
    /// Binds the resource at `url` to `target`.
    ///
    /// Synchronously cancels the target's previously outstanding fetch (if
    /// any) and sets `placeholder` as the visible content, then starts the
    /// fetch. When it completes un-superseded, the asset replaces the
    /// placeholder on success; on failure the placeholder stays and the
    /// error goes to the failure sink. A completion that arrives after the
    /// target was rebound changes nothing.
    ///
    /// Rebinding the same URL still cancels and restarts; in-flight fetches
    /// are not de-duplicated across rebinds.
    pub fn bind(&self, target: Arc<dyn DisplayTarget>, url: &str, placeholder: Option<Arc<Asset>>) {
        let target_id = target.id();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // Supersede: register this binding, canceling the previous one.
        {
            let mut registry = self.registry.lock().unwrap();
            if let Some(previous) = registry.insert(
                target_id,
                BindingEntry {
                    generation,
                    handle: None,
                },
            ) {
                if let Some(handle) = previous.handle {
                    debug!(target_id = target_id.as_u64(), url = url, "superseding fetch");
                    handle.cancel();
                }
            }
        }

        target.set_content(placeholder);

        let registry = Arc::clone(&self.registry);
        let alive = Arc::clone(&self.alive);
        let failures = Arc::clone(&self.failures);
        let callback_target = Arc::clone(&target);
        let context = url.to_string();

        let handle = self.client.fetch(url, move |result| {
            if !alive.load(Ordering::Acquire) {
                return;
            }

            // Stale-completion guard: clean up and touch the target only if
            // this binding is still the current one.
            {
                let mut registry = registry.lock().unwrap();
                match registry.get(&target_id) {
                    Some(entry) if entry.generation == generation => {
                        registry.remove(&target_id);
                    }
                    _ => return,
                }
            }

            match result {
                Ok(asset) => callback_target.set_content(Some(asset)),
                Err(error) => failures.failure(&context, &error),
            }
        });

        // A cache hit ran the callback synchronously and deregistered
        // itself; only an actual transport call leaves a handle to record.
        if let Some(handle) = handle {
            let mut registry = self.registry.lock().unwrap();
            if let Some(entry) = registry.get_mut(&target_id) {
                if entry.generation == generation {
                    entry.handle = Some(handle);
                }
            }
        }
    }
}

impl<T: AsyncTransport> Drop for ImageBinder<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::StaticTransport;
    use std::time::Duration;

    struct TestTarget {
        id: TargetId,
        content: Mutex<Option<Arc<Asset>>>,
    }

    impl TestTarget {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: TargetId::next(),
                content: Mutex::new(None),
            })
        }

        fn content(&self) -> Option<Arc<Asset>> {
            self.content.lock().unwrap().clone()
        }
    }

    impl DisplayTarget for TestTarget {
        fn id(&self) -> TargetId {
            self.id
        }

        fn set_content(&self, content: Option<Arc<Asset>>) {
            *self.content.lock().unwrap() = content;
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        failures: Mutex<Vec<(String, FetchError)>>,
    }

    impl FailureSink for RecordingSink {
        fn failure(&self, context: &str, error: &FetchError) {
            self.failures
                .lock()
                .unwrap()
                .push((context.to_string(), error.clone()));
        }
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition never became true");
    }

    #[tokio::test]
    async fn test_bind_applies_fetched_asset() {
        let binder = ImageBinder::new(ImageClient::new(StaticTransport::ok(vec![1, 2, 3]), None));
        let target = TestTarget::new();

        binder.bind(target.clone(), "https://example.com/a.png", None);

        wait_for(|| target.content().is_some()).await;
        assert_eq!(target.content().unwrap().as_bytes(), &[1, 2, 3]);
        assert_eq!(binder.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_bind_failure_keeps_placeholder_and_reports() {
        let sink = Arc::new(RecordingSink::default());
        let binder = ImageBinder::new(ImageClient::new(
            StaticTransport::err(FetchError::Status(404)),
            None,
        ))
        .with_failure_sink(sink.clone());

        let target = TestTarget::new();
        let placeholder = Arc::new(Asset::from_bytes(vec![9]));
        binder.bind(
            target.clone(),
            "https://example.com/missing.png",
            Some(placeholder.clone()),
        );

        wait_for(|| !sink.failures.lock().unwrap().is_empty()).await;
        assert_eq!(target.content().unwrap(), placeholder);
        assert_eq!(binder.outstanding(), 0);

        let failures = sink.failures.lock().unwrap();
        assert_eq!(failures[0].0, "https://example.com/missing.png");
        assert_eq!(failures[0].1, FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_bind_cache_hit_applies_synchronously() {
        let transport = StaticTransport::ok(vec![7, 7]);
        let binder = ImageBinder::new(ImageClient::new(transport, None));
        let target = TestTarget::new();

        binder.bind(target.clone(), "https://example.com/a.png", None);
        wait_for(|| target.content().is_some()).await;

        // Rebind the now-cached URL: content is applied before bind returns.
        let second = TestTarget::new();
        binder.bind(second.clone(), "https://example.com/a.png", None);
        assert_eq!(second.content().unwrap().as_bytes(), &[7, 7]);
        assert_eq!(binder.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_same_url_rebind_restarts_fetch() {
        let transport = Arc::new(StaticTransport::err(FetchError::Status(500)));
        let binder = ImageBinder::new(ImageClient::new(transport.clone(), None));
        let target = TestTarget::new();

        binder.bind(target.clone(), "https://example.com/a.png", None);
        wait_for(|| binder.outstanding() == 0).await;
        binder.bind(target.clone(), "https://example.com/a.png", None);
        wait_for(|| binder.outstanding() == 0).await;

        // Failures are never cached, so each rebind issues a fresh call.
        assert_eq!(transport.calls(), 2);
        assert_eq!(binder.client().cache().entry_count(), 0);
    }
}
