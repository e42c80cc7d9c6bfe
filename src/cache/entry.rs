//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

/// Longest TTL honoured (about 100 years); longer ones are clamped.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
///
/// Timestamps come from `tokio::time::Instant`, so a paused test runtime
/// controls expiry deterministically.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time the entry was written
    pub created_at: Instant,
    /// Absolute expiry time; the entry is dead once `now >= expires_at`
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry that lives for `ttl_seconds` from now,
    /// capped at `MAX_TTL_SECS`.
    pub fn new(value: V, ttl_seconds: u64) -> Self {
        let now = Instant::now();
        let ttl = Duration::from_secs(ttl_seconds.min(MAX_TTL_SECS));
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: once the TTL has fully elapsed the entry is
    /// expired, so a TTL of zero produces an entry that is never readable.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Expiry check against an explicit instant, used by sweeps that
    /// evaluate many entries against one clock reading.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
