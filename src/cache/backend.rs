//! Cache Backends
//!
//! Async, fallible cache interface shared by the in-memory store and any
//! remote store. Values are JSON documents so every backend can persist them.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::error::CacheError;

/// Operations every cache backend provides.
///
/// Implementations may fail; callers go through `FailOpenCache`, which
/// turns every failure into a miss or a no-op.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

// == Memory Cache ==
/// In-memory backend: a `CacheStore` behind one lock.
///
/// Every operation, including reads (which update LRU state), takes the
/// write half, so all access is serialised through a single mutual
/// exclusion domain. Cloning shares the same store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<CacheStore<Value>>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries))),
        }
    }

    /// Removes expired entries now; returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.store.write().await.get(key))
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), CacheError> {
        let evicted = self
            .store
            .write()
            .await
            .set(key.to_string(), value, ttl_seconds);
        if let Some(evicted) = evicted {
            debug!(evicted_key = %evicted, "Memory cache LRU eviction");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.write().await.delete(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.store.write().await.exists(key))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        Ok(self.store.read().await.stats())
    }
}
