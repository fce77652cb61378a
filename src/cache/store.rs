//! Bounded Store Module
//!
//! Default bounded cache: HashMap slots with LRU eviction and optional
//! time-to-live, behind a single mutex.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::{BoundedCache, CacheStats, LruTracker, Slot};

// == Store State ==
#[derive(Debug)]
struct StoreState<K, E> {
    /// Key-slot storage
    slots: HashMap<K, Slot<E>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K: Eq + Hash + Clone, E> StoreState<K, E> {
    fn remove(&mut self, key: &K) -> Option<Slot<E>> {
        let slot = self.slots.remove(key)?;
        self.lru.remove(key);
        Some(slot)
    }

    fn sync_len(&mut self) {
        let len = self.slots.len();
        self.stats.set_total_entries(len);
    }
}

// == Bounded Store ==
/// Size-bounded, concurrency-safe key to entry store.
///
/// When a new key arrives at capacity the least recently used slot is
/// evicted. Expired slots read as absent.
#[derive(Debug)]
pub struct BoundedStore<K, E> {
    state: Mutex<StoreState<K, E>>,
    /// Maximum number of slots allowed
    max_entries: usize,
    /// Time-to-live applied on every write
    time_to_live: Option<Duration>,
}

impl<K: Eq + Hash + Clone, E: Clone> BoundedStore<K, E> {
    // == Constructor ==
    /// Creates a new store with the given capacity and optional TTL.
    pub fn new(max_entries: usize, time_to_live: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                slots: HashMap::new(),
                lru: LruTracker::new(),
                stats: CacheStats::new(),
            }),
            max_entries,
            time_to_live,
        }
    }

    fn lookup(state: &mut StoreState<K, E>, key: &K) -> Option<E> {
        let expired = match state.slots.get(key) {
            Some(slot) => slot.is_expired(),
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if expired {
            state.remove(key);
            state.stats.record_expirations(1);
            state.stats.record_miss();
            state.sync_len();
            return None;
        }

        state.stats.record_hit();
        state.lru.touch(key);
        state.slots.get(key).map(|slot| slot.entry.clone())
    }
}

impl<K, E> BoundedCache<K, E> for BoundedStore<K, E>
where
    K: Eq + Hash + Clone + Send + Sync,
    E: Clone + Send + Sync,
{
    // == Get ==
    fn get_if_present(&self, key: &K) -> Option<E> {
        let mut state = self.state.lock();
        Self::lookup(&mut state, key)
    }

    fn get_all_present(&self, keys: &[K]) -> HashMap<K, E> {
        let mut state = self.state.lock();
        keys.iter()
            .filter_map(|key| Self::lookup(&mut state, key).map(|entry| (key.clone(), entry)))
            .collect()
    }

    // == Put ==
    /// Stores `entry`, overwriting any previous slot and resetting its TTL.
    fn put(&self, key: K, entry: E) {
        let mut state = self.state.lock();

        if self.max_entries == 0 {
            state.stats.record_eviction();
            return;
        }

        let is_overwrite = state.slots.contains_key(&key);
        if !is_overwrite && state.slots.len() >= self.max_entries {
            if let Some(evicted_key) = state.lru.evict_oldest() {
                state.slots.remove(&evicted_key);
                state.stats.record_eviction();
                trace!("evicted least recently used slot");
            }
        }

        state.slots.insert(key.clone(), Slot::new(entry, self.time_to_live));
        state.lru.touch(&key);
        state.sync_len();
    }

    // == Invalidate ==
    /// Removes `key`. An expired slot is dropped but not handed back.
    fn invalidate(&self, key: &K) -> Option<E> {
        let mut state = self.state.lock();
        let slot = state.remove(key);
        state.sync_len();

        let slot = slot?;
        if slot.is_expired() {
            state.stats.record_expirations(1);
            return None;
        }
        Some(slot.entry)
    }

    fn invalidate_if(&self, key: &K, predicate: &dyn Fn(&E) -> bool) -> bool {
        let mut state = self.state.lock();
        let matches = state.slots.get(key).is_some_and(|slot| predicate(&slot.entry));
        if matches {
            state.remove(key);
            state.sync_len();
        }
        matches
    }

    fn invalidate_keys(&self, keys: &[K]) -> Vec<E> {
        let mut state = self.state.lock();
        let removed: Vec<E> = keys
            .iter()
            .filter_map(|key| state.remove(key))
            .filter(|slot| !slot.is_expired())
            .map(|slot| slot.entry)
            .collect();
        state.sync_len();
        removed
    }

    fn invalidate_all(&self) {
        let mut state = self.state.lock();
        state.slots.clear();
        state.lru.clear();
        state.sync_len();
    }

    // == Clean Up ==
    /// Removes expired slots and releases spare capacity.
    ///
    /// Returns the number of slots removed.
    fn clean_up(&self) -> usize {
        let mut state = self.state.lock();

        let expired_keys: Vec<K> = state
            .slots
            .iter()
            .filter(|(_, slot)| slot.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in &expired_keys {
            state.remove(key);
        }

        state.stats.record_expirations(count);
        state.slots.shrink_to_fit();
        state.lru.shrink_to_fit();
        state.sync_len();
        count
    }

    fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.slots.len());
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn store(max_entries: usize) -> BoundedStore<String, String> {
        BoundedStore::new(max_entries, None)
    }

    fn put(store: &BoundedStore<String, String>, key: &str, value: &str) {
        store.put(key.to_string(), value.to_string());
    }

    fn get(store: &BoundedStore<String, String>, key: &str) -> Option<String> {
        store.get_if_present(&key.to_string())
    }

    #[test]
    fn test_store_new() {
        let store = store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_put_and_get() {
        let store = store(100);

        put(&store, "key1", "value1");
        assert_eq!(get(&store, "key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        assert_eq!(get(&store(100), "nonexistent"), None);
    }

    #[test]
    fn test_store_invalidate() {
        let store = store(100);

        put(&store, "key1", "value1");
        assert_eq!(store.invalidate(&"key1".to_string()), Some("value1".to_string()));
        assert_eq!(store.invalidate(&"key1".to_string()), None);

        assert!(store.is_empty());
        assert_eq!(get(&store, "key1"), None);
    }

    #[test]
    fn test_store_invalidate_if_matches_current_entry() {
        let store = store(100);
        put(&store, "key1", "value1");

        assert!(!store.invalidate_if(&"key1".to_string(), &|v: &String| v == "stale"));
        assert_eq!(store.len(), 1);

        assert!(store.invalidate_if(&"key1".to_string(), &|v: &String| v == "value1"));
        assert!(store.is_empty());
        assert!(!store.invalidate_if(&"key1".to_string(), &|_: &String| true));
    }

    #[test]
    fn test_store_invalidate_expired_returns_nothing() {
        let store = BoundedStore::new(100, Some(Duration::from_millis(50)));
        store.put("key1".to_string(), 1u32);

        sleep(Duration::from_millis(80));

        assert_eq!(store.invalidate(&"key1".to_string()), None);
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let store = store(100);

        put(&store, "key1", "value1");
        put(&store, "key1", "value2");

        assert_eq!(get(&store, "key1"), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_all_present() {
        let store = store(100);
        put(&store, "a", "1");
        put(&store, "b", "2");

        let found = store.get_all_present(&["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(found.len(), 2);
        assert_eq!(found.get("a"), Some(&"1".to_string()));
        assert!(!found.contains_key("c"));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = BoundedStore::new(100, Some(Duration::from_millis(50)));
        store.put("key1".to_string(), 1u32);

        assert_eq!(store.get_if_present(&"key1".to_string()), Some(1));

        sleep(Duration::from_millis(80));

        assert_eq!(store.get_if_present(&"key1".to_string()), None);
        assert_eq!(store.stats().expirations, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = store(3);

        put(&store, "key1", "value1");
        put(&store, "key2", "value2");
        put(&store, "key3", "value3");

        // Store is full, adding key4 should evict key1 (oldest)
        put(&store, "key4", "value4");

        assert_eq!(store.len(), 3);
        assert_eq!(get(&store, "key1"), None);
        assert!(get(&store, "key2").is_some());
        assert!(get(&store, "key3").is_some());
        assert!(get(&store, "key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let store = store(3);

        put(&store, "key1", "value1");
        put(&store, "key2", "value2");
        put(&store, "key3", "value3");

        // Access key1 to make it most recently used
        get(&store, "key1");

        // Adding key4 should evict key2 (now oldest)
        put(&store, "key4", "value4");

        assert!(get(&store, "key1").is_some());
        assert_eq!(get(&store, "key2"), None);
    }

    #[test]
    fn test_store_zero_capacity_keeps_nothing() {
        let store = store(0);
        put(&store, "key1", "value1");

        assert!(store.is_empty());
        assert_eq!(get(&store, "key1"), None);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_stats() {
        let store = store(100);

        put(&store, "key1", "value1");
        get(&store, "key1"); // hit
        get(&store, "nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_invalidate_keys_and_all() {
        let store = store(100);
        put(&store, "a", "1");
        put(&store, "b", "2");
        put(&store, "c", "3");

        let removed = store.invalidate_keys(&["a".to_string(), "b".to_string(), "z".to_string()]);
        assert_eq!(removed.len(), 2);
        assert_eq!(store.len(), 1);

        store.invalidate_all();
        assert!(store.is_empty());
        assert_eq!(store.stats().total_entries, 0);
    }

    #[test]
    fn test_store_clean_up_expired() {
        let store = BoundedStore::new(100, Some(Duration::from_millis(50)));
        store.put("key1".to_string(), 1u32);

        sleep(Duration::from_millis(80));
        store.put("key2".to_string(), 2u32);

        let removed = store.clean_up();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_if_present(&"key2".to_string()), Some(2));
    }

    #[test]
    fn test_store_concurrent_puts_respect_capacity() {
        let store = std::sync::Arc::new(BoundedStore::new(16, None));

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..100u32 {
                        store.put(t * 1000 + i, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 16);
        assert_eq!(store.stats().evictions, 400 - 16);
    }
}
