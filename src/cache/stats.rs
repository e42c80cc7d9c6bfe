//! Cache diagnostics.

use serde::Serialize;

/// Counters and size of one cache store.
///
/// Counters only grow for the life of the store; `clear` empties entries
/// but keeps them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing live, including expired entries
    pub misses: u64,
    /// Entries displaced by the LRU policy
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    pub total_entries: usize,
    /// `None` for stores that are not bounded locally (Redis)
    pub capacity: Option<usize>,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that hit; 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    /// Fraction of capacity in use, for bounded stores.
    pub fn utilization(&self) -> Option<f64> {
        self.capacity
            .filter(|cap| *cap > 0)
            .map(|cap| self.total_entries as f64 / cap as f64)
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub(crate) fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
