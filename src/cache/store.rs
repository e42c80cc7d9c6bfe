//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded in-memory storage with per-entry TTL and LRU eviction.
///
/// Every key in `entries` has exactly one record in `lru` and vice versa;
/// all mutations below update both together. The store itself is not
/// synchronised; callers share it behind a single lock (see `MemoryCache`).
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Inserts or replaces a value that expires `ttl_seconds` from now.
    ///
    /// If the key is new and the store is full, the least recently
    /// accessed entry is evicted before inserting. Returns the evicted key.
    pub fn set(&mut self, key: String, value: V, ttl_seconds: u64) -> Option<String> {
        let is_overwrite = self.entries.contains_key(&key);

        let mut evicted = None;
        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                evicted = Some(evicted_key);
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value, ttl_seconds));
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        evicted
    }

    // == Get ==
    /// Returns the value unless it was never set or has expired.
    ///
    /// An expired entry is removed on the way out. A hit refreshes the
    /// key's LRU position but never its expiry.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !self.check_live(key) {
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Exists ==
    /// Same expiry semantics as `get`, without cloning the value.
    pub fn exists(&mut self, key: &str) -> bool {
        if self.check_live(key) {
            self.lru.touch(key);
            true
        } else {
            false
        }
    }

    // == Delete ==
    /// Removes an entry and its access record. Returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.lru.remove(key);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes everything. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats.capacity = Some(self.max_entries);
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether `key` holds a live entry; drops it if it has expired.
    fn check_live(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_total_entries(self.entries.len());
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_keys(&self) -> usize {
        self.lru.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::advance;

    fn store(capacity: usize) -> CacheStore<String> {
        CacheStore::new(capacity)
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut store = store(0);
        store.set("a".into(), "1".into(), 60);
        assert_eq!(store.capacity(), 1);
        assert_eq!(store.get("a"), Some("1".to_string()));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 300);

        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store(100);
        assert_eq!(store.get("nonexistent"), None);
        assert!(!store.exists("nonexistent"));
    }

    #[test]
    fn test_store_delete() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 300);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.tracked_keys(), 0);
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_nonexistent_is_not_an_error() {
        let mut store = store(100);
        assert!(!store.delete("nonexistent"));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 300);
        store.set("key1".to_string(), "value2".to_string(), 300);

        assert_eq!(store.get("key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_clear() {
        let mut store = store(100);
        store.set("a".into(), "1".into(), 300);
        store.set("b".into(), "2".into(), 300);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.tracked_keys(), 0);
        assert!(!store.exists("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_ttl_expiration() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 1);
        assert!(store.exists("key1"));

        advance(Duration::from_secs(2)).await;

        assert_eq!(store.get("key1"), None);
        assert_eq!(store.len(), 0, "expired entry should be removed on read");
        assert_eq!(store.tracked_keys(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exists_removes_expired_entry() {
        let mut store = store(100);
        store.set("key1".to_string(), "value1".to_string(), 1);

        advance(Duration::from_secs(2)).await;

        assert!(!store.exists("key1"));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_refresh_ttl() {
        let mut store = store(100);
        store.set("k".to_string(), "v".to_string(), 10);

        advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k"), Some("v".to_string()));

        advance(Duration::from_secs(6)).await;
        assert_eq!(store.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_ttl() {
        let mut store = store(100);
        store.set("k".to_string(), "v1".to_string(), 10);

        advance(Duration::from_secs(8)).await;
        store.set("k".to_string(), "v2".to_string(), 10);
        advance(Duration::from_secs(8)).await;

        assert_eq!(store.get("k"), Some("v2".to_string()));
    }

    #[test]
    fn test_store_accepts_max_ttl() {
        let mut store = store(4);

        store.set("k".to_string(), "v".to_string(), u64::MAX);

        assert_eq!(store.get("k"), Some("v".to_string()));
        assert_eq!(store.cleanup_expired(), 0);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store(3);

        store.set("key1".to_string(), "value1".to_string(), 300);
        store.set("key2".to_string(), "value2".to_string(), 300);
        store.set("key3".to_string(), "value3".to_string(), 300);

        let evicted = store.set("key4".to_string(), "value4".to_string(), 300);

        assert_eq!(evicted.as_deref(), Some("key1"));
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1"), None);
        assert!(store.get("key2").is_some());
        assert!(store.get("key3").is_some());
        assert!(store.get("key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = store(3);

        store.set("key1".to_string(), "value1".to_string(), 300);
        store.set("key2".to_string(), "value2".to_string(), 300);
        store.set("key3".to_string(), "value3".to_string(), 300);

        store.get("key1");

        let evicted = store.set("key4".to_string(), "value4".to_string(), 300);
        assert_eq!(evicted.as_deref(), Some("key2"));
        assert!(store.get("key1").is_some());
    }

    #[test]
    fn test_store_lru_touch_on_exists() {
        let mut store = store(2);

        store.set("a".to_string(), "1".to_string(), 300);
        store.set("b".to_string(), "2".to_string(), 300);
        assert!(store.exists("a"));

        let evicted = store.set("c".to_string(), "3".to_string(), 300);
        assert_eq!(evicted.as_deref(), Some("b"));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        store.set("a".to_string(), "1".to_string(), 300);
        store.set("b".to_string(), "2".to_string(), 300);
        let evicted = store.set("a".to_string(), "3".to_string(), 300);

        assert_eq!(evicted, None);
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 300);
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.capacity, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_cleanup_expired() {
        let mut store = store(100);

        store.set("key1".to_string(), "value1".to_string(), 1);
        store.set("key2".to_string(), "value2".to_string(), 10);

        advance(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.tracked_keys(), 1);
        assert!(store.get("key2").is_some());
    }
}
