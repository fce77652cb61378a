//! Compressed Cache Facade
//!
//! Key-value store operations over a bounded cache whose slots hold
//! compressed entries. Values are compressed on write with the cache's
//! entry policy and restored on read.
//!
//! Check-then-act operations (`put_if_absent`, `replace`, the compare
//! variants and the `get_and_*` family) read and then write the bounded
//! cache in two steps. A concurrent writer can slip in between; closing that
//! window needs an atomic compare-and-set from the bounded cache.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{BoundedCache, BoundedStore, CacheStats};
use crate::codec::{Compressor, Serializer, ValueCodec};
use crate::config::{CacheConfig, EntryPolicy};
use crate::entry::{CompressedEntry, RetainedValues};
use crate::error::{CacheError, Result};

/// Stored form of every slot.
pub type EntryRef<V> = Arc<CompressedEntry<V>>;

// == Compressed Cache ==
/// A named cache that keeps its values compressed.
pub struct CompressedCache<K, V> {
    name: String,
    policy: EntryPolicy,
    store: Box<dyn BoundedCache<K, EntryRef<V>>>,
    codec: Arc<ValueCodec<V>>,
    retained: Arc<RetainedValues<V>>,
    closed: AtomicBool,
    compression_failures: AtomicU64,
    unreadable_entries: AtomicU64,
}

impl<K, V> CompressedCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache backed by a [`BoundedStore`] sized from `config`.
    pub fn new(
        name: impl Into<String>,
        config: &CacheConfig,
        serializer: Arc<dyn Serializer<V>>,
    ) -> Self {
        let store = BoundedStore::new(config.max_entries, config.time_to_live);
        let codec = ValueCodec::new(serializer, Compressor::new(config.compression_level));

        Self::with_store(
            name,
            config.policy,
            Box::new(store),
            codec,
            RetainedValues::new(config.retained_values),
        )
    }

    /// Creates a cache on top of a caller-supplied bounded cache.
    pub fn with_store(
        name: impl Into<String>,
        policy: EntryPolicy,
        store: Box<dyn BoundedCache<K, EntryRef<V>>>,
        codec: ValueCodec<V>,
        retained: RetainedValues<V>,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            store,
            codec: Arc::new(codec),
            retained: Arc::new(retained),
            closed: AtomicBool::new(false),
            compression_failures: AtomicU64::new(0),
            unreadable_entries: AtomicU64::new(0),
        }
    }

    // == Entry Construction ==
    /// Compresses `value` with the configured policy. An entry that did not
    /// compress is dropped here and never reaches the store.
    fn create_entry(&self, key: &K, value: V) -> Result<EntryRef<V>> {
        let entry =
            CompressedEntry::new(self.policy, value, Arc::clone(&self.codec), &self.retained);

        if entry.is_valid() {
            Ok(Arc::new(entry))
        } else {
            self.compression_failures.fetch_add(1, Ordering::Relaxed);
            warn!(cache = %self.name, key = ?key, "value could not be compressed, write rejected");
            Err(CacheError::compression_failure(key))
        }
    }

    fn read_entry(&self, key: &K, entry: &EntryRef<V>) -> Option<Arc<V>> {
        let value = entry.uncompressed_value();
        if value.is_none() {
            self.unreadable_entries.fetch_add(1, Ordering::Relaxed);
            debug!(cache = %self.name, key = ?key, "stored entry could not be restored");
        }
        value
    }

    /// Restores a slot's entry and evicts the slot if the entry turns out to
    /// be unreadable.
    fn read_stored(&self, key: &K, entry: &EntryRef<V>) -> Option<Arc<V>> {
        let value = self.read_entry(key, entry);
        if value.is_none() {
            self.evict_unreadable(key, entry);
        }
        value
    }

    /// Drops the slot for `key` if it still holds `entry`. A concurrent write
    /// that already replaced the slot is left alone.
    fn evict_unreadable(&self, key: &K, entry: &EntryRef<V>) {
        let same_entry = |stored: &EntryRef<V>| Arc::ptr_eq(stored, entry);
        if self.store.invalidate_if(key, &same_entry) {
            debug!(cache = %self.name, key = ?key, "unreadable entry evicted");
        }
    }

    /// Returns the slot for `key`, evicting it instead if its entry has
    /// already failed.
    fn lookup(&self, key: &K) -> Option<EntryRef<V>> {
        let entry = self.store.get_if_present(key)?;
        if entry.is_valid() {
            Some(entry)
        } else {
            self.evict_unreadable(key, &entry);
            None
        }
    }

    // == Get ==
    /// Returns the value stored under `key`.
    ///
    /// A missing key and an entry that can no longer be restored both read
    /// as `None`. An unreadable entry is evicted, so its key is absent from
    /// then on.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let entry = self.lookup(key)?;
        self.read_stored(key, &entry)
    }

    /// Like [`CompressedCache::get`], but reports a stored entry that can no
    /// longer be restored as `DecompressionFailure` instead of `None`. The
    /// entry is evicted either way, so only the first read reports it.
    pub fn try_get(&self, key: &K) -> Result<Option<Arc<V>>> {
        let Some(entry) = self.store.get_if_present(key) else {
            return Ok(None);
        };
        match self.read_stored(key, &entry) {
            Some(value) => Ok(Some(value)),
            None => Err(CacheError::DecompressionFailure {
                key: format!("{:?}", key),
            }),
        }
    }

    /// Returns the restorable values for those of `keys` that are present.
    pub fn get_all(&self, keys: &[K]) -> HashMap<K, Arc<V>> {
        self.store
            .get_all_present(keys)
            .into_iter()
            .filter_map(|(key, entry)| {
                let value = self.read_stored(&key, &entry)?;
                Some((key, value))
            })
            .collect()
    }

    /// Whether a usable slot exists for `key`, without restoring its value.
    pub fn contains_key(&self, key: &K) -> bool {
        self.lookup(key).is_some()
    }

    // == Put ==
    /// Compresses and stores `value` under `key`.
    ///
    /// On `CompressionFailure` the previous value, if any, stays in place.
    pub fn put(&self, key: K, value: V) -> Result<()> {
        let entry = self.create_entry(&key, value)?;
        self.store.put(key, entry);
        Ok(())
    }

    /// Stores `value` and returns the value it replaced.
    pub fn get_and_put(&self, key: K, value: V) -> Result<Option<Arc<V>>> {
        let previous = self.lookup(&key);
        let entry = self.create_entry(&key, value)?;
        self.store.put(key.clone(), entry);

        Ok(previous.and_then(|previous| self.read_entry(&key, &previous)))
    }

    /// Stores every pair in order, stopping at the first failure.
    pub fn put_all<I>(&self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }

    /// Stores `value` only if no slot exists for `key`.
    pub fn put_if_absent(&self, key: K, value: V) -> Result<bool> {
        if self.contains_key(&key) {
            return Ok(false);
        }
        self.put(key, value)?;
        Ok(true)
    }

    // == Remove ==
    /// Removes the slot for `key`, returning whether one existed.
    pub fn remove(&self, key: &K) -> bool {
        match self.store.invalidate(key) {
            Some(entry) => {
                entry.release_copy();
                true
            }
            None => false,
        }
    }

    /// Removes `key` only if its restored value equals `expected`.
    pub fn remove_if_equals(&self, key: &K, expected: &V) -> bool
    where
        V: PartialEq,
    {
        match self.get(key) {
            Some(current) if *current == *expected => self.remove(key),
            _ => false,
        }
    }

    /// Removes `key` and returns its restored value.
    pub fn get_and_remove(&self, key: &K) -> Option<Arc<V>> {
        let entry = self.store.invalidate(key)?;
        let value = self.read_entry(key, &entry);
        entry.release_copy();
        value
    }

    pub fn remove_keys(&self, keys: &[K]) {
        for entry in self.store.invalidate_keys(keys) {
            entry.release_copy();
        }
    }

    /// Removes every slot and runs the store's maintenance hook.
    pub fn remove_all(&self) {
        self.clear();
    }

    /// Removes every slot, drops retained copies and runs the store's
    /// maintenance hook.
    pub fn clear(&self) {
        self.store.invalidate_all();
        self.retained.clear();
        self.store.clean_up();
    }

    // == Replace ==
    /// Stores `value` only if a slot already exists for `key`.
    pub fn replace(&self, key: K, value: V) -> Result<bool> {
        if !self.contains_key(&key) {
            return Ok(false);
        }
        self.put(key, value)?;
        Ok(true)
    }

    /// Stores `new_value` only if the restored current value equals
    /// `expected`. Comparison happens on decompressed values.
    pub fn replace_if_equals(&self, key: K, expected: &V, new_value: V) -> Result<bool>
    where
        V: PartialEq,
    {
        match self.get(&key) {
            Some(current) if *current == *expected => {
                self.put(key, new_value)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Stores `value` if a slot exists and returns the value it replaced.
    pub fn get_and_replace(&self, key: K, value: V) -> Result<Option<Arc<V>>> {
        let Some(previous) = self.lookup(&key) else {
            return Ok(None);
        };
        let entry = self.create_entry(&key, value)?;
        self.store.put(key.clone(), entry);

        Ok(self.read_entry(&key, &previous))
    }

    // == Accessors ==
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> EntryPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Runs the store's maintenance hook, returning how many slots it dropped.
    pub fn clean_up(&self) -> usize {
        self.store.clean_up()
    }

    /// Store statistics combined with this cache's codec failure counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.store.stats();
        stats.compression_failures = self.compression_failures.load(Ordering::Relaxed);
        stats.unreadable_entries = self.unreadable_entries.load(Ordering::Relaxed);
        stats
    }

    /// Marks the cache closed. Stored values are not released.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // == Unsupported Surface ==
    /// Iteration over stored values is not supported.
    pub fn iter(&self) -> Result<impl Iterator<Item = (K, Arc<V>)>> {
        Err::<std::iter::Empty<_>, _>(CacheError::Unsupported("iterator"))
    }

    /// In-place mutation through an entry processor is not supported.
    pub fn invoke<T, F>(&self, _key: &K, _processor: F) -> Result<T>
    where
        F: FnOnce(&K, Option<&V>) -> T,
    {
        Err(CacheError::Unsupported("invoke"))
    }

    pub fn invoke_all<T, F>(&self, _keys: &[K], _processor: F) -> Result<HashMap<K, T>>
    where
        F: FnMut(&K, Option<&V>) -> T,
    {
        Err(CacheError::Unsupported("invoke_all"))
    }

    /// There is no loader behind this cache.
    pub fn load_all(&self, _keys: &[K], _replace_existing: bool) -> Result<()> {
        Err(CacheError::Unsupported("load_all"))
    }

    pub fn register_listener<L>(&self, _listener: L) -> Result<()>
    where
        L: Fn(&K, Option<&V>) + Send + Sync + 'static,
    {
        Err(CacheError::Unsupported("register_listener"))
    }

    pub fn deregister_listener<L>(&self, _listener: L) -> Result<()>
    where
        L: Fn(&K, Option<&V>) + Send + Sync + 'static,
    {
        Err(CacheError::Unsupported("deregister_listener"))
    }

    pub fn configuration(&self) -> Result<CacheConfig> {
        Err(CacheError::Unsupported("configuration"))
    }

    pub fn unwrap<T: 'static>(&self) -> Result<&T> {
        Err(CacheError::Unsupported("unwrap"))
    }
}

impl<K, V> fmt::Debug for CompressedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedCache")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
