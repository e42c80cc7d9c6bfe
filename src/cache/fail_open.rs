//! Fail-open cache access
//!
//! Cache trouble must make the service slower, never broken: every backend
//! error or timeout is logged and turned into a miss (reads) or a no-op
//! (writes).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheBackend, CacheKey, CacheStats};
use crate::error::CacheError;

/// Default time budget for a single cache operation.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(500);

/// Typed, fail-open front for any `CacheBackend`.
#[derive(Clone)]
pub struct FailOpenCache {
    backend: Arc<dyn CacheBackend>,
    op_timeout: Duration,
}

impl FailOpenCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn CacheBackend>, op_timeout: Duration) -> Self {
        Self {
            backend,
            op_timeout,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Reads and decodes a value. Any failure, including a stored value
    /// that no longer decodes as `T`, is reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let value = self
            .guard("get", key.as_str(), self.backend.get(key.as_str()))
            .await
            .flatten()?;

        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key = %key, error = %err, "Cached value did not decode; treating as miss");
                None
            }
        }
    }

    /// Encodes and stores a value. Failures are logged and swallowed.
    pub async fn set_json<T: Serialize>(&self, key: &CacheKey, value: &T, ttl_seconds: u64) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %CacheError::from(err), "Cache set skipped");
                return;
            }
        };

        if self
            .guard("set", key.as_str(), self.backend.set(key.as_str(), value, ttl_seconds))
            .await
            .is_some()
        {
            debug!(key = %key, ttl = ttl_seconds, backend = self.backend.name(), "Cache set");
        }
    }

    pub async fn delete(&self, key: &str) {
        self.guard("delete", key, self.backend.delete(key)).await;
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.guard("exists", key, self.backend.exists(key))
            .await
            .unwrap_or(false)
    }

    pub async fn clear(&self) {
        self.guard("clear", "*", self.backend.clear()).await;
    }

    /// Diagnostics; `None` when the backend cannot report them right now.
    pub async fn stats(&self) -> Option<CacheStats> {
        self.guard("stats", "*", self.backend.stats()).await
    }

    /// Runs one backend operation under the time budget, logging failures.
    async fn guard<T, F>(&self, op: &'static str, key: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        let outcome = match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        };

        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    op,
                    key,
                    backend = self.backend.name(),
                    error = %err,
                    "Cache operation failed; continuing without cache"
                );
                None
            }
        }
    }
}
