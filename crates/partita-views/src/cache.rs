#![forbid(unsafe_code)]

//! LRU memoization for derived projections.
//!
//! Projections are pure functions of `(chart, inputs)`, so a rebuilt view
//! can be served from cache whenever the same chart asks again with equal
//! inputs. Entries are stored under the full [`ProjectionKey`] and found by
//! FxHash, then confirmed by equality, so two inputs that hash alike never
//! share a result. Nothing expires by time.
//!
//! # Example
//! ```
//! use partita_views::{ProjectionCache, ProjectionKey};
//!
//! let mut cache: ProjectionCache<ProjectionKey<(u64, bool)>, Vec<u32>> = ProjectionCache::new(8);
//! let key = ProjectionKey::new("sunburst", (42_u64, true));
//!
//! let first = cache.get_or_compute_with(key.clone(), || vec![1, 2, 3]);
//! let again = cache.get_or_compute_with(key, || unreachable!());
//! assert_eq!(first, again);
//!
//! let stats = cache.stats();
//! assert_eq!(stats.hits, 1);
//! assert_eq!(stats.misses, 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use rustc_hash::FxBuildHasher;
use tracing::trace;

/// Default number of memoized projections per cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Cache performance counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Current number of entries.
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache key: the chart that asked plus the inputs of its projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectionKey<I> {
    pub chart_id: String,
    pub inputs: I,
}

impl<I> ProjectionKey<I> {
    #[must_use]
    pub fn new(chart_id: impl Into<String>, inputs: I) -> Self {
        Self {
            chart_id: chart_id.into(),
            inputs,
        }
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

/// LRU cache of shared projection results.
///
/// Not thread-safe; wrap in a mutex for shared use.
pub struct ProjectionCache<K, V> {
    cache: LruCache<K, Arc<V>, FxBuildHasher>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V> fmt::Debug for ProjectionCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionCache")
            .field("len", &self.cache.len())
            .field("capacity", &self.cache.cap())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl<K: Hash + Eq, V> ProjectionCache<K, V> {
    /// Cache holding up to `capacity` entries; zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::with_hasher(non_zero(capacity), FxBuildHasher),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute_with<F>(&mut self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.cache.get(&key) {
            self.hits += 1;
            return Arc::clone(value);
        }

        self.misses += 1;
        trace!(size = self.cache.len(), "projection cache miss");
        let value = Arc::new(compute());
        self.cache.put(key, Arc::clone(&value));
        value
    }

    /// Whether `key` is cached. Does not touch LRU order.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }

    /// Cached value without touching LRU order or stats.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<Arc<V>> {
        self.cache.peek(key).cloned()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Change capacity, evicting least recently used entries if needed.
    pub fn resize(&mut self, capacity: usize) {
        self.cache.resize(non_zero(capacity));
    }
}

impl<K: Hash + Eq, V> Default for ProjectionCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
