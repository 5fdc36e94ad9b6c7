//! Revalidate-on-interval read cache for content API responses.
//!
//! Entries are keyed by request (URL + locale) and considered fresh for the
//! revalidate window the caller asks for at read time. Only successful JSON
//! responses are stored. The map is bounded: a full cache first drops entries
//! past their own window, then the oldest entry.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default bound on stored responses.
pub const MAX_CACHE_ENTRIES: usize = 1024;

#[derive(Debug, Clone)]
struct CachedResponse {
    fetched_at: Instant,
    ttl: Duration,
    value: Value,
}

impl CachedResponse {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) >= self.ttl
    }
}

/// In-process response cache shared by clones of an `ApiClient`.
#[derive(Debug)]
pub struct RevalidateCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
    max_entries: usize,
}

impl Default for RevalidateCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }
}

impl RevalidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached value if it is younger than `max_age`.
    ///
    /// Stale entries are evicted on read.
    pub fn get(&self, key: &str, max_age: Duration) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < max_age => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value` under `key`; `ttl` is the window used when sweeping.
    pub fn insert(&self, key: String, value: Value, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let now = Instant::now();
            entries.retain(|_, entry| !entry.is_expired(now));

            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CachedResponse {
                fetched_at: Instant::now(),
                ttl,
                value,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_get_returns_fresh_entry() {
        let cache = RevalidateCache::new();
        cache.insert("k".to_string(), json!({"a": 1}), MINUTE);

        assert_eq!(cache.get("k", MINUTE), Some(json!({"a": 1})));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = RevalidateCache::new();
        assert_eq!(cache.get("missing", MINUTE), None);
    }

    #[test]
    fn test_stale_entry_is_evicted() {
        let cache = RevalidateCache::new();
        cache.insert("k".to_string(), json!(1), MINUTE);

        assert_eq!(cache.get("k", Duration::ZERO), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let cache = RevalidateCache::new();
        cache.insert("k".to_string(), json!(1), MINUTE);
        cache.insert("k".to_string(), json!(2), MINUTE);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k", MINUTE), Some(json!(2)));
    }

    // ==================== Capacity Tests ====================

    #[test]
    fn test_never_exceeds_capacity() {
        let cache = RevalidateCache::with_capacity(8);
        for i in 0..300 {
            cache.insert(format!("post-{}", i), json!(i), MINUTE);
        }

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.get("post-299", MINUTE), Some(json!(299)));
    }

    #[test]
    fn test_full_cache_sweeps_expired_entries_first() {
        let cache = RevalidateCache::with_capacity(3);
        cache.insert("expired-a".to_string(), json!(1), Duration::ZERO);
        cache.insert("fresh".to_string(), json!(2), MINUTE);
        cache.insert("expired-b".to_string(), json!(3), Duration::ZERO);

        cache.insert("new".to_string(), json!(4), MINUTE);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("fresh", MINUTE), Some(json!(2)));
        assert_eq!(cache.get("new", MINUTE), Some(json!(4)));
    }

    #[test]
    fn test_full_cache_evicts_oldest_when_all_fresh() {
        let cache = RevalidateCache::with_capacity(2);
        cache.insert("first".to_string(), json!(1), MINUTE);
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("second".to_string(), json!(2), MINUTE);
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("third".to_string(), json!(3), MINUTE);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first", MINUTE), None);
        assert_eq!(cache.get("second", MINUTE), Some(json!(2)));
    }

    #[test]
    fn test_overwrite_at_capacity_keeps_other_entries() {
        let cache = RevalidateCache::with_capacity(2);
        cache.insert("a".to_string(), json!(1), MINUTE);
        cache.insert("b".to_string(), json!(2), MINUTE);
        cache.insert("a".to_string(), json!(3), MINUTE);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b", MINUTE), Some(json!(2)));
    }
}
