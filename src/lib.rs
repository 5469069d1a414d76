//! ImageClient - asynchronous image fetching, caching, and display binding
//!
//! This library retrieves binary image resources over HTTP, caches decoded
//! results by source URL, and binds in-flight and completed fetches to
//! display targets so that a target never shows a stale or out-of-order
//! result.
//!
//! # High-Level API
//!
//! Most callers construct an [`ImageBinder`](binding::ImageBinder) around an
//! [`ImageClient`](fetch::ImageClient) and bind URLs to display targets:
//!
//! ```ignore
//! use imageclient::binding::ImageBinder;
//! use imageclient::fetch::ImageClient;
//!
//! let client = ImageClient::with_defaults()?;
//! let binder = ImageBinder::new(client);
//!
//! // Cancels whatever `view` was previously waiting on, shows the
//! // placeholder immediately, and applies the asset when it arrives.
//! binder.bind(view, "https://example.com/logo.png", Some(placeholder));
//! ```
//!
//! Direct callers that need the raw fetch result (and error) can use
//! [`ImageClient::fetch`](fetch::ImageClient::fetch) instead.

pub mod asset;
pub mod binding;
pub mod cache;
pub mod dispatch;
pub mod fetch;
pub mod transport;

/// Version of the imageclient library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
