//! Least-recently-used bookkeeping for the cache store.

use std::collections::{BTreeMap, HashMap};

/// One access record per key, ordered by a logical clock.
///
/// Every touch takes the next tick of a strictly increasing sequence, so two
/// records never share a last-access time and the eviction victim is always
/// unique.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// key -> tick of its last access
    ticks: HashMap<String, u64>,
    /// tick -> key, oldest first
    by_tick: BTreeMap<u64, String>,
    clock: u64,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access, creating the record on first use.
    pub fn touch(&mut self, key: &str) {
        let tick = self.clock;
        self.clock += 1;

        match self.ticks.get_mut(key) {
            Some(previous) => {
                self.by_tick.remove(previous);
                *previous = tick;
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
            }
        }
        self.by_tick.insert(tick, key.to_string());
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.ticks.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict ==
    /// Drops and returns the key whose last access is oldest.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, victim) = self.by_tick.pop_first()?;
        self.ticks.remove(&victim);
        Some(victim)
    }

    pub fn last_access(&self, key: &str) -> Option<u64> {
        self.ticks.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
        self.by_tick.clear();
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
