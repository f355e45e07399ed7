//! In-memory TTL store.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use cachefront_core::constants::DEFAULT_MAX_ENTRIES;
use cachefront_core::error::Result;
use cachefront_core::traits::CacheStore;

/// Cache entry with TTL.
#[derive(Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }
}

/// Store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of entries. `0` is treated as `1`: a store always holds
    /// the entry it was just given.
    pub max_entries: usize,
    /// Whether to purge expired entries before evicting live ones
    pub auto_cleanup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            auto_cleanup: true,
        }
    }
}

/// In-memory key/value store with per-entry expiration.
///
/// Thread-safe. Reads hand out clones, so a caller mutating what it got back
/// never touches the stored value. Keys are used verbatim.
pub struct MemoryStore<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    config: StoreConfig,
}

impl<V: Clone> MemoryStore<V> {
    /// Creates a new store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(mut config: StoreConfig) -> Self {
        config.max_entries = config.max_entries.max(1);
        Self {
            entries: RwLock::new(HashMap::with_capacity(config.max_entries.min(1024))),
            config,
        }
    }

    /// Creates a store holding at most `max_entries`.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self::with_config(StoreConfig {
            max_entries,
            ..Default::default()
        })
    }

    /// Gets a live entry by key.
    ///
    /// Returns None if not stored or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone())
    }

    /// Stores a value with the given TTL.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            if self.config.auto_cleanup {
                entries.retain(|_, e| !e.is_expired());
            }

            // Still at capacity? Remove oldest entry
            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    debug!(key = %oldest_key, "Evicting oldest entry");
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes an entry.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        StoreStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl<V: Clone> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn read(&self, key: &str) -> Result<Option<V>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        self.set(key, value, ttl);
        Ok(())
    }
}

/// Store statistics.
#[derive(Clone, Debug)]
pub struct StoreStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries not yet purged
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_store_set_get() {
        let store = MemoryStore::new();
        store.set("widget/42", "blue".to_string(), HOUR);
        assert_eq!(store.get("widget/42").as_deref(), Some("blue"));
    }

    #[test]
    fn test_store_miss() {
        let store: MemoryStore<String> = MemoryStore::new();
        assert!(store.get("widget/1").is_none());
    }

    #[test]
    fn test_store_keys_are_verbatim() {
        let store = MemoryStore::new();
        store.set("widget/abc", 1, HOUR);
        assert!(store.get("widget/ABC").is_none());
    }

    #[test]
    fn test_store_overwrite() {
        let store = MemoryStore::new();
        store.set("widget/42", 1, HOUR);
        store.set("widget/42", 2, HOUR);
        assert_eq!(store.get("widget/42"), Some(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_returns_copies() {
        let store = MemoryStore::new();
        store.set("widget/42", vec![1, 2, 3], HOUR);

        let mut first = store.get("widget/42").unwrap();
        first.push(4);

        assert_eq!(store.get("widget/42"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_store_remove_and_clear() {
        let store = MemoryStore::new();
        store.set("a", 1, HOUR);
        store.set("b", 2, HOUR);

        store.remove("a");
        assert!(store.get("a").is_none());

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = MemoryStore::new();

        // Set with very short TTL
        store.set("widget/42", 1, Duration::from_millis(1));

        std::thread::sleep(Duration::from_millis(10));

        assert!(store.get("widget/42").is_none());
    }

    #[test]
    fn test_store_capacity_eviction() {
        let store = MemoryStore::with_capacity(2);

        store.set("a", 1, HOUR);
        std::thread::sleep(Duration::from_millis(2));
        store.set("b", 2, HOUR);
        std::thread::sleep(Duration::from_millis(2));
        store.set("c", 3, HOUR);

        // Oldest evicted
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
        assert_eq!(store.get("c"), Some(3));
    }

    #[test]
    fn test_store_zero_capacity_holds_one_entry() {
        let store = MemoryStore::with_config(StoreConfig {
            max_entries: 0,
            auto_cleanup: true,
        });
        assert_eq!(store.stats().capacity, 1);

        store.set("a", 1, HOUR);
        assert_eq!(store.get("a"), Some(1));
        store.set("b", 2, HOUR);

        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_none());
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_store_overwrite_at_capacity_keeps_others() {
        let store = MemoryStore::with_capacity(2);
        store.set("a", 1, HOUR);
        store.set("b", 2, HOUR);
        store.set("a", 10, HOUR);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = MemoryStore::new();

        store.set("a", 1, Duration::from_millis(1));
        store.set("b", 2, HOUR);

        std::thread::sleep(Duration::from_millis(10));

        let stats = store.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.valid_entries, 1);

        store.cleanup_expired();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b"), Some(2));
    }

    #[test]
    fn test_store_trait_roundtrip() {
        let store = MemoryStore::new();
        CacheStore::write(&store, "widget/7", 7u32, HOUR).unwrap();
        assert_eq!(CacheStore::read(&store, "widget/7").unwrap(), Some(7));
        assert_eq!(CacheStore::<u32>::read(&store, "widget/8").unwrap(), None);
    }
}
