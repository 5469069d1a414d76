//! Binding fetch results to display targets.
//!
//! [`ImageBinder`] is the component UI code calls: it wraps
//! [`ImageClient`](crate::fetch::ImageClient) with per-target bookkeeping so
//! that binding a new URL to a target supersedes whatever that target was
//! previously waiting on.

mod binder;
mod target;

pub use binder::{FailureSink, ImageBinder, TracingSink};
pub use target::{DisplayTarget, TargetId};
