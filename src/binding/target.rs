//! Display targets.

use crate::asset::Asset;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique identity of a display target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocates a fresh identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the numeric identity.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Something that can display an asset (an image view analog).
///
/// Implementations are expected to hand out a stable [`TargetId`] for the
/// lifetime of the target; the binder keys its registry on it.
pub trait DisplayTarget: Send + Sync {
    /// Returns this target's stable identity.
    fn id(&self) -> TargetId;

    /// Replaces the target's visible content.
    ///
    /// `None` clears the content.
    fn set_content(&self, content: Option<Arc<Asset>>);
}
