//! Mock transports for testing.
//!
//! These are shipped publicly (not behind `cfg(test)`) so integration tests
//! and downstream consumers can exercise the fetch pipeline without a
//! network. All of them honor the transport contract of the HTTP transports,
//! including the empty-body rule.

use super::http::{AsyncTransport, Transport};
use super::types::FetchError;
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Semaphore;

/// Transport that returns a canned response and counts calls.
pub struct StaticTransport {
    response: Mutex<Result<Vec<u8>, FetchError>>,
    calls: AtomicUsize,
}

impl StaticTransport {
    /// Creates a transport that succeeds with the given body bytes.
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            response: Mutex::new(Ok(body)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a transport that fails with the given error.
    pub fn err(error: FetchError) -> Self {
        Self {
            response: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replaces the canned response for subsequent calls.
    pub fn set_response(&self, response: Result<Vec<u8>, FetchError>) {
        *self.response.lock().unwrap() = response;
    }

    /// Returns how many times `fetch_bytes` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.response.lock().unwrap().clone()?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(Bytes::from(body))
    }
}

impl Transport for StaticTransport {
    fn fetch_bytes(&self, _url: &str) -> Result<Bytes, FetchError> {
        self.respond()
    }
}

impl AsyncTransport for StaticTransport {
    async fn fetch_bytes(&self, _url: &str) -> Result<Bytes, FetchError> {
        self.respond()
    }
}

/// File-backed transport: serves the contents of a local file as the body.
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    /// Creates a transport serving the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn classify(bytes: Vec<u8>) -> Result<Bytes, FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(Bytes::from(bytes))
    }
}

impl Transport for FileTransport {
    fn fetch_bytes(&self, _url: &str) -> Result<Bytes, FetchError> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| FetchError::Connection(format!("failed to read file: {e}")))?;
        Self::classify(bytes)
    }
}

impl AsyncTransport for FileTransport {
    async fn fetch_bytes(&self, _url: &str) -> Result<Bytes, FetchError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FetchError::Connection(format!("failed to read file: {e}")))?;
        Self::classify(bytes)
    }
}

/// Transport that holds each async call until explicitly released.
///
/// Useful for supersession and cancellation tests: start a fetch, cancel or
/// rebind while it is provably still in flight, then release the gate. Each
/// call consumes one permit; successful responses echo the request URL as
/// the body so tests can tell which fetch produced a result.
pub struct GatedTransport {
    gate: Semaphore,
    failure: Mutex<Option<FetchError>>,
    calls: AtomicUsize,
}

impl GatedTransport {
    /// Creates a gated transport with no permits available.
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Makes subsequent released calls fail with the given error.
    pub fn fail_with(&self, error: FetchError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Releases one pending (or future) call.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    /// Returns how many times `fetch_bytes` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for GatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncTransport for GatedTransport {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| FetchError::Connection("gate closed".to_string()))?;
        permit.forget();

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(Bytes::copy_from_slice(url.as_bytes()))
    }
}
