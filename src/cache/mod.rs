//! Asset caching.

mod memory;

pub use memory::{AssetCache, CacheStats};
