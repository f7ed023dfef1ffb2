//! TTL-bounded cache for rendered feed pages.
//!
//! The site feed is served from this cache for a short, fixed window.
//! Writes to the underlying data within the window are intentionally not
//! reflected; entries expire by TTL or an explicit [`PageCache::clear`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

/// Default TTL for cached feed pages.
const DEFAULT_TTL: Duration = Duration::from_secs(20);

struct Entry {
    body: String,
    stored_at: Instant,
}

/// In-process cache of rendered feed bodies, keyed by request URI.
#[derive(Clone)]
pub struct PageCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCache {
    /// Create a cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Get a cached body if present and not expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            debug!(key = %key, "Cache entry expired");
            return None;
        }
        debug!(key = %key, "Cache hit");
        Some(entry.body.clone())
    }

    /// Store a rendered body under a key.
    pub fn set(&self, key: &str, body: String) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_string(),
                Entry {
                    body,
                    stored_at: Instant::now(),
                },
            );
        }
    }

    /// Drop every entry immediately.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
        debug!("Cleared page cache");
    }

    /// Number of stored entries, including not-yet-evicted expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |e| e.len())
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_stored_body() {
        let cache = PageCache::with_ttl(Duration::from_secs(60));
        cache.set("/", "feed body".to_string());

        assert_eq!(cache.get("/"), Some("feed body".to_string()));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = PageCache::new();
        assert!(cache.get("/missing").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = PageCache::with_ttl(Duration::from_millis(10));
        cache.set("/", "stale".to_string());

        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get("/").is_none());
    }

    #[test]
    fn test_clear_drops_entries() {
        let cache = PageCache::with_ttl(Duration::from_secs(60));
        cache.set("/", "body".to_string());
        cache.set("/?page=2", "body2".to_string());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("/").is_none());
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let cache = PageCache::with_ttl(Duration::from_secs(60));
        cache.set("/", "old".to_string());
        cache.set("/", "new".to_string());

        assert_eq!(cache.get("/"), Some("new".to_string()));
        assert_eq!(cache.len(), 1);
    }
}
