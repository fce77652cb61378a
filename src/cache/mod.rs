//! Cache Module
//!
//! The bounded storage substrate for compressed entries: a size/recency
//! limited, concurrency-safe key to entry map.

mod lru;
mod slot;
mod stats;
mod store;


use std::collections::HashMap;

// Re-export public types
pub use lru::LruTracker;
pub use slot::Slot;
pub use stats::CacheStats;
pub use store::BoundedStore;

// == Bounded Cache ==
/// Storage contract the compressed cache layers itself on.
///
/// Implementations own eviction; callers only require safe concurrent map
/// semantics. There is no atomic compare-and-set in this contract.
pub trait BoundedCache<K, E>: Send + Sync {
    /// Returns the entry for `key` if one is stored.
    fn get_if_present(&self, key: &K) -> Option<E>;

    /// Returns the stored entries for those of `keys` that are present.
    fn get_all_present(&self, keys: &[K]) -> HashMap<K, E>;

    /// Stores `entry` under `key`, replacing any previous entry.
    fn put(&self, key: K, entry: E);

    /// Removes `key`, returning the entry it held.
    fn invalidate(&self, key: &K) -> Option<E>;

    /// Removes `key` only while its stored entry matches `predicate`.
    fn invalidate_if(&self, key: &K, predicate: &dyn Fn(&E) -> bool) -> bool;

    /// Removes every key in `keys`, returning the entries they held.
    fn invalidate_keys(&self, keys: &[K]) -> Vec<E>;

    fn invalidate_all(&self);

    /// Maintenance hook; returns how many stale slots were dropped.
    fn clean_up(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> CacheStats;
}
