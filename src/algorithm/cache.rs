//! Per-worker memoization of nearest-tile lookups

use crate::analysis::signature::ColorSignature;
use std::collections::HashMap;
use std::ops::AddAssign;

/// Memoization cache for nearest-tile lookups
///
/// Target images repeat colors heavily (skies, backgrounds), so each worker
/// keeps one of these to avoid rescanning every signature for a color it has
/// already matched.
#[derive(Default)]
pub struct MatchCache {
    /// Query color to winning candidate index
    matches: HashMap<ColorSignature, usize>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

impl AddAssign for CacheStats {
    fn add_assign(&mut self, other: Self) {
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl MatchCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct colors cached
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Retrieve the cached match or compute and store a new one
    ///
    /// Uses the provided closure only when `color` has not been seen. Empty
    /// results are not cached.
    pub fn get_or_compute<F>(&mut self, color: ColorSignature, compute_fn: F) -> Option<usize>
    where
        F: FnOnce() -> Option<usize>,
    {
        use std::collections::hash_map::Entry;

        match self.matches.entry(color) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Some(*entry.get())
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                let index = compute_fn()?;
                entry.insert(index);
                Some(index)
            }
        }
    }
}
