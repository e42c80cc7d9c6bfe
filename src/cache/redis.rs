//! Redis Cache Backend
//!
//! Optional remote store (cargo feature `redis`). TTL is delegated to
//! `SETEX`; values are stored as JSON strings under a fixed key prefix.
//! Every operation is fallible and is expected to be wrapped in
//! `FailOpenCache`.

use async_trait::async_trait;
use ::redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde_json::Value;
use tracing::info;

use crate::cache::{CacheBackend, CacheStats, MAX_TTL_SECS};
use crate::error::CacheError;

/// Prefix applied to every key this service writes.
pub const KEY_PREFIX: &str = "llm_codegen:cache:";

/// Redis-backed cache store sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    /// Connects to `url`. Fails if the server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(redis_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(redis_error)?;

        info!(url, "Redis cache connected");
        Ok(Self { conn })
    }

    fn prefixed(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

fn redis_error(err: ::redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::prefixed(key)).await.map_err(redis_error)?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&value)?;
        let _: () = conn
            .set_ex(Self::prefixed(key), payload, ttl_seconds.clamp(1, MAX_TTL_SECS))
            .await
            .map_err(redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(Self::prefixed(key)).await.map_err(redis_error)?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        conn.exists(Self::prefixed(key)).await.map_err(redis_error)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(format!("{KEY_PREFIX}*"))
            .await
            .map_err(redis_error)?;
        if keys.is_empty() {
            return Ok(());
        }

        let _: i64 = conn.del(keys).await.map_err(redis_error)?;
        info!("Redis cache cleared");
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(format!("{KEY_PREFIX}*"))
            .await
            .map_err(redis_error)?;

        let mut stats = CacheStats::new();
        stats.set_total_entries(keys.len());
        Ok(stats)
    }
}
