//! Byte-fetch transport layer.
//!
//! Transports turn a URL string into body bytes or a classified failure.
//! The fetch layer consumes them through the [`AsyncTransport`] trait; a
//! blocking [`Transport`] form exists for callers outside an async runtime.

mod http;
pub mod mock;
mod types;

pub use http::{AsyncHttpTransport, AsyncTransport, HttpTransport, Transport};
pub use types::{FetchError, TransportConfig};
