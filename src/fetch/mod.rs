//! Fetch coordination.
//!
//! [`ImageClient`] satisfies fetch requests from the asset cache when it
//! can, and from the transport when it must, delivering results to
//! caller-supplied callbacks on a configurable execution context.
//! [`FetchHandle`] lets a caller cancel an in-flight fetch.

mod client;
mod handle;

pub use client::{FetchResult, ImageClient};
pub use handle::{FetchHandle, HandleState};
