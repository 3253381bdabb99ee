//! Match result caching
//!
//! Resolving the same location repeatedly (pop-state back and forth, link
//! clicks to the current page) walks the whole route table each time. The
//! cache keeps recent matcher results with an LRU eviction policy. Any
//! change to the route table clears it.

use crate::config::Strategy;
use crate::{trace_log, Match};
use lru::LruCache;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: usize = 100;

/// Cache key: everything the matcher output depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatchCacheKey {
    location: String,
    to: String,
    strategy: Strategy,
}

/// Cache performance statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache of matcher results
pub struct MatchCache {
    entries: LruCache<MatchCacheKey, Vec<Match>>,
    stats: CacheStats,
}

impl MatchCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` results (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Look up the matches for a location
    pub fn get(&mut self, location: &str, to: &str, strategy: Strategy) -> Option<Vec<Match>> {
        let key = MatchCacheKey {
            location: location.to_string(),
            to: to.to_string(),
            strategy,
        };

        match self.entries.get(&key) {
            Some(matches) => {
                self.stats.hits += 1;
                trace_log!("match cache hit for '{}'", location);
                Some(matches.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store the matches for a location
    pub fn insert(&mut self, location: &str, to: &str, strategy: Strategy, matches: Vec<Match>) {
        let key = MatchCacheKey {
            location: location.to_string(),
            to: to.to_string(),
            strategy,
        };
        self.entries.put(key, matches);
    }

    /// Drop every entry (route table changed)
    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            trace_log!("match cache invalidated ({} entries)", self.entries.len());
        }
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Number of cached locations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCache")
            .field("len", &self.entries.len())
            .field("cap", &self.entries.cap())
            .field("stats", &self.stats)
            .finish()
    }
}
