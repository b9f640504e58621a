// src/api/cache.rs
//! Short-lived response cache for API calls.
//!
//! Caches raw response bodies keyed by request URI, with TTL-based expiry.
//! On a hit the cached body is re-parsed through the same code path as a
//! live response, so cached and fresh answers cannot diverge in shape.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct CacheEntry {
    data: String,
    cached_at: DateTime<Utc>,
}

/// TTL-based in-memory cache for raw API response strings.
///
/// Owned by one client for one run. A zero TTL disables caching.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    /// Returns cached data if the entry exists and has not expired.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now - entry.cached_at > self.ttl {
            entries.remove(key);
            return None;
        }
        Some(entry.data.clone())
    }

    /// Stores data in the cache, purging whatever has expired meanwhile.
    pub fn set(&self, key: &str, data: &str, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }

        self.purge_expired(now);
        self.entries.lock().insert(
            key.to_string(),
            CacheEntry {
                data: data.to_string(),
                cached_at: now,
            },
        );
    }

    /// Removes all expired entries.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries
            .lock()
            .retain(|_, entry| now - entry.cached_at <= ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::minutes(15));
        cache.set("/v2/blog/x/posts?id=1", "{}", at(0));
        assert_eq!(
            cache.get("/v2/blog/x/posts?id=1", at(14 * 60)),
            Some("{}".to_string())
        );
        assert_eq!(cache.get("/v2/blog/x/posts?id=2", at(1)), None);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = ResponseCache::new(Duration::minutes(15));
        cache.set("k", "v", at(0));
        assert_eq!(cache.get("k", at(15 * 60 + 1)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_purges_expired_entries() {
        let cache = ResponseCache::new(Duration::seconds(10));
        cache.set("old", "1", at(0));
        cache.set("new", "2", at(11));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new", at(12)), Some("2".to_string()));
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = ResponseCache::new(Duration::zero());
        cache.set("k", "v", at(0));
        assert_eq!(cache.get("k", at(0)), None);
        assert!(!cache.is_enabled());
    }
}
