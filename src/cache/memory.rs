//! In-memory asset cache.

use crate::asset::{Asset, ResourceId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Asset cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of lookups that found an entry
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Current number of entries
    pub entry_count: usize,
}

struct CacheInner {
    entries: HashMap<ResourceId, Arc<Asset>>,
    stats: CacheStats,
}

/// Shared mapping from resource identifier to decoded asset.
///
/// The single source of truth for "have we already fetched this". Unbounded
/// and process-lifetime: entries are never evicted or overwritten. Cloning
/// yields another handle to the same underlying map, so a cache can be
/// shared across clients. Safe for concurrent lookup/store from parallel
/// fetch completions.
#[derive(Clone)]
pub struct AssetCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl AssetCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            })),
        }
    }

    /// Looks up the asset cached for `id`.
    ///
    /// A miss is a normal, expected outcome, not an error.
    pub fn lookup(&self, id: &ResourceId) -> Option<Arc<Asset>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.entries.get(id).cloned() {
            Some(asset) => {
                inner.stats.hits += 1;
                Some(asset)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Stores `asset` for `id`, first write wins.
    ///
    /// If an entry already exists it is kept unchanged (idempotent write).
    /// Returns the asset actually retained under `id`.
    pub fn store(&self, id: ResourceId, asset: Arc<Asset>) -> Arc<Asset> {
        let mut inner = self.inner.lock().unwrap();
        let retained = inner.entries.entry(id).or_insert(asset).clone();
        inner.stats.entry_count = inner.entries.len();
        retained
    }

    /// Returns true if an asset is cached for `id`.
    ///
    /// Does not count as a hit or miss.
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.inner.lock().unwrap().entries.contains_key(id)
    }

    /// Returns the current number of cached entries.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.lock().unwrap().stats.clone()
    }
}

impl Default for AssetCache {
    fn default() -> Self {
        Self::new()
    }
}
