//! Cache Module
//!
//! Bounded in-memory caching with TTL expiration and LRU eviction, key
//! derivation for generation and validation requests, and a fail-open
//! front that keeps cache trouble away from callers.

mod backend;
mod entry;
mod fail_open;
pub mod keys;
mod lru;
#[cfg(feature = "redis")]
mod redis;
mod stats;
mod store;


// Re-export public types
pub use backend::{CacheBackend, MemoryCache};
pub use entry::{CacheEntry, MAX_TTL_SECS};
pub use fail_open::{FailOpenCache, DEFAULT_OP_TIMEOUT};
pub use keys::{CacheKey, KeyNamespace};
pub use lru::LruTracker;
#[cfg(feature = "redis")]
pub use self::redis::RedisCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// TTL for generation results, in seconds
pub const GENERATION_TTL_SECS: u64 = 3600;

/// TTL for validation results, in seconds
pub const VALIDATION_TTL_SECS: u64 = 1800;
