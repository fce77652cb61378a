//! Retained Values Pool
//!
//! Keeps a bounded number of decompressed values strongly reachable so that
//! fast entries, which only hold weak handles, can skip decompression.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

// == Retained Values ==
/// Capped FIFO of strong handles to recently produced values.
///
/// Dropping a handle from the pool is how a fast entry's copy gets
/// reclaimed: once no pool slot and no caller holds the `Arc`, the entry's
/// weak handle stops resolving and the next read decompresses.
///
/// Removal through the cache releases the removed value; a slot dropped by
/// LRU eviction leaves its value here until newer values push it out.
pub struct RetainedValues<V> {
    capacity: usize,
    values: Mutex<VecDeque<Arc<V>>>,
}

impl<V> RetainedValues<V> {
    /// Creates a pool holding at most `capacity` values; 0 disables retention.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    // == Retain ==
    /// Keeps `value` reachable, releasing the oldest handle when full.
    pub fn retain(&self, value: Arc<V>) {
        if self.capacity == 0 {
            return;
        }

        let mut values = self.values.lock();
        while values.len() >= self.capacity {
            values.pop_front();
        }
        values.push_back(value);
    }

    /// Releases every handle to `value`, leaving other values retained.
    pub fn release(&self, value: &Arc<V>) {
        self.values.lock().retain(|held| !Arc::ptr_eq(held, value));
    }

    /// Releases every retained handle.
    pub fn clear(&self) {
        self.values.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl<V> fmt::Debug for RetainedValues<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetainedValues")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_up_to_capacity() {
        let pool = RetainedValues::new(2);

        let first = Arc::new(1);
        let weak_first = Arc::downgrade(&first);
        pool.retain(first);
        pool.retain(Arc::new(2));
        assert_eq!(pool.len(), 2);
        assert!(weak_first.upgrade().is_some());

        // third value pushes out the oldest
        pool.retain(Arc::new(3));
        assert_eq!(pool.len(), 2);
        assert!(weak_first.upgrade().is_none());
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let pool = RetainedValues::new(0);
        let value = Arc::new("value");
        let weak = Arc::downgrade(&value);

        pool.retain(value);
        assert!(pool.is_empty());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_release_drops_only_matching_handle() {
        let pool = RetainedValues::new(4);
        let first = Arc::new(1);
        let second = Arc::new(1);
        let weak_first = Arc::downgrade(&first);

        pool.retain(Arc::clone(&first));
        pool.retain(second);
        pool.release(&first);
        drop(first);

        assert_eq!(pool.len(), 1);
        assert!(weak_first.upgrade().is_none());
    }

    #[test]
    fn test_clear_releases_handles() {
        let pool = RetainedValues::new(4);
        let value = Arc::new(7);
        let weak = Arc::downgrade(&value);

        pool.retain(value);
        pool.clear();
        assert!(pool.is_empty());
        assert!(weak.upgrade().is_none());
    }
}
