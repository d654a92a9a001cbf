//! Key-based memoization of normalized responses with time-based expiry.
//!
//! Keys come from [`build_key`], which sorts query parameters so that two
//! call sites passing the same parameters in a different order share one
//! entry. An entry is served while `now - stored_at < expiry`; the first
//! lookup after that evicts it. There is no size bound: entries live until
//! they expire or [`RequestCache::clear`] is called.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Build a cache key from a logical path and its parameters.
///
/// ```rust
/// use quran_core::cache::build_key;
///
/// assert_eq!(build_key("search", &[("b", "2"), ("a", "1")]), "search?a=1&b=2");
/// assert_eq!(build_key("chapters", &[]), "chapters");
/// ```
#[must_use]
pub fn build_key(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{joined}")
}

/// A cached payload and the time it was stored.
#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    stored_at: DateTime<Utc>,
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Number of stored entries, expired ones included until next lookup.
    pub size: usize,
    /// Stored keys in lexicographic order.
    pub keys: Vec<String>,
}

/// In-memory response cache owned by one client session.
#[derive(Debug)]
pub struct RequestCache {
    entries: HashMap<String, CacheEntry>,
    expiry: Duration,
    enabled: bool,
}

impl RequestCache {
    /// Create an enabled cache with the given expiry.
    #[must_use]
    pub fn new(expiry: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            expiry,
            enabled: true,
        }
    }

    /// Create a cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            entries: HashMap::new(),
            expiry: Duration::zero(),
            enabled: false,
        }
    }

    /// Whether the cache stores payloads at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured expiry.
    #[must_use]
    pub const fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Look up a payload as of now.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, Utc::now())
    }

    /// Look up a payload as of `now`, evicting it if it has expired.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<Value> {
        if !self.enabled {
            return None;
        }

        let entry = self.entries.get(key)?;
        if now - entry.stored_at < self.expiry {
            debug!("cache hit: {key}");
            return Some(entry.payload.clone());
        }

        debug!("cache entry expired: {key}");
        self.entries.remove(key);
        None
    }

    /// Store a payload stamped with the current time.
    pub fn put(&mut self, key: impl Into<String>, payload: Value) {
        self.put_at(key, payload, Utc::now());
    }

    /// Store a payload stamped with `now`, replacing any existing entry.
    pub fn put_at(&mut self, key: impl Into<String>, payload: Value, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                stored_at: now,
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count and key listing.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: keys.len(),
            keys,
        }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(Duration::hours(24))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_ignores_param_order() {
        let a = build_key("surah/1", &[("b", "2"), ("a", "1")]);
        let b = build_key("surah/1", &[("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
        assert_eq!(a, "surah/1?a=1&b=2");
    }

    #[test]
    fn test_key_without_params_is_bare_path() {
        assert_eq!(build_key("chapters", &[]), "chapters");
    }

    #[test]
    fn test_entry_served_until_expiry() {
        let expiry = Duration::hours(24);
        let mut cache = RequestCache::new(expiry);
        let stored = Utc::now();
        cache.put_at("k", json!({"v": 1}), stored);

        let just_before = stored + expiry - Duration::milliseconds(1);
        assert_eq!(cache.get_at("k", just_before), Some(json!({"v": 1})));

        let just_after = stored + expiry + Duration::milliseconds(1);
        assert_eq!(cache.get_at("k", just_after), None);
        assert!(cache.is_empty(), "expired entry should be evicted");
    }

    #[test]
    fn test_put_overwrites_and_restamps() {
        let expiry = Duration::minutes(10);
        let mut cache = RequestCache::new(expiry);
        let t0 = Utc::now();
        cache.put_at("k", json!(1), t0);
        cache.put_at("k", json!(2), t0 + Duration::minutes(9));

        let later = t0 + Duration::minutes(15);
        assert_eq!(cache.get_at("k", later), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_and_stats() {
        let mut cache = RequestCache::default();
        cache.put("surah/2?editions=quran-uthmani", json!([]));
        cache.put("chapters", json!([]));

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(
            stats.keys,
            vec![
                "chapters".to_string(),
                "surah/2?editions=quran-uthmani".to_string()
            ]
        );

        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let mut cache = RequestCache::disabled();
        cache.put("k", json!(true));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
        assert!(!cache.is_enabled());
    }
}
