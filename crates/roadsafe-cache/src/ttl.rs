use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};

/// TTL applied by `get` when the caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// A cached value and the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub data: V,
    pub stored_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Fresh while `now - stored_at <= ttl`. A zero TTL is never fresh.
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if ttl.is_zero() {
            return false;
        }
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.stored_at <= ttl,
            Err(_) => true,
        }
    }
}

/// Key/value cache whose entries expire when read past their TTL.
///
/// Expiry is lazy: a stale entry stays in the map until a `get` observes it
/// or it is invalidated. Writers are not coordinated; the last `set` wins.
pub struct TtlCache<V, C: Clock = SystemClock> {
    entries: DashMap<String, CacheEntry<V>>,
    clock: C,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V, SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self::with_clock(SystemClock, default_ttl)
    }
}

impl<V: Clone> Default for TtlCache<V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone, C: Clock> TtlCache<V, C> {
    pub fn with_clock(clock: C, default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the value for `key` if it is younger than `ttl` (default 30s).
    ///
    /// A stale entry is evicted and reported as a miss. A hit leaves the
    /// stored timestamp untouched.
    pub fn get(&self, key: &str, ttl: Option<Duration>) -> Option<V> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh(now, ttl) {
                tracing::trace!(key, "cache hit");
                return Some(entry.data.clone());
            }
        } else {
            tracing::trace!(key, "cache miss");
            return None;
        }

        // The read guard above is released before touching the shard again.
        self.entries.remove_if(key, |_, entry| !entry.is_fresh(now, ttl));
        tracing::trace!(key, "cache entry expired");
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            data: value,
            stored_at: self.clock.now(),
        };
        self.entries.insert(key.into(), entry);
    }

    /// Remove one entry. No-op if absent.
    pub fn invalidate(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            tracing::debug!(key, "cache entry invalidated");
        }
    }

    /// Remove every entry whose key contains `pattern`.
    pub fn invalidate_pattern(&self, pattern: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.contains(pattern));
        tracing::debug!(
            pattern,
            removed = before.saturating_sub(self.entries.len()),
            "cache entries invalidated by pattern"
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is stored, without checking its age.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
