//! Cache Registry
//!
//! Process-scoped map from cache names to compressed caches. Build one
//! registry at startup and share it as `Arc<CacheRegistry>`.

use std::any::Any;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::codec::{JsonSerializer, Serializer};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::facade::CompressedCache;

// == Registered Cache ==
/// Type-erased view of a registered cache.
pub trait RegisteredCache: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the cache's maintenance hook.
    fn clean_up(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<K, V> RegisteredCache for CompressedCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        CompressedCache::name(self)
    }

    fn clean_up(&self) -> usize {
        CompressedCache::clean_up(self)
    }

    fn len(&self) -> usize {
        CompressedCache::len(self)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// == Cache Registry ==
/// Holds at most one cache per name.
#[derive(Default)]
pub struct CacheRegistry {
    caches: DashMap<String, Arc<dyn RegisteredCache>>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Get Or Create ==
    /// Returns the cache registered under `name`, creating it from `config`
    /// and `serializer` on first use.
    ///
    /// Concurrent first-time calls for the same name all receive the same
    /// instance. The config and serializer of later calls are ignored. Asking
    /// for a name that holds other key/value types fails with
    /// `TypeMismatch`.
    pub fn get_or_create<K, V>(
        &self,
        name: &str,
        config: &CacheConfig,
        serializer: Arc<dyn Serializer<V>>,
    ) -> Result<Arc<CompressedCache<K, V>>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        if let Some(existing) = self.caches.get(name) {
            let existing = Arc::clone(existing.value());
            return Self::downcast(name, existing);
        }

        let cache = self
            .caches
            .entry(name.to_string())
            .or_insert_with(|| {
                info!(
                    cache = name,
                    policy = %config.policy,
                    max_entries = config.max_entries,
                    "creating compressed cache"
                );
                Arc::new(CompressedCache::<K, V>::new(name, config, serializer))
                    as Arc<dyn RegisteredCache>
            })
            .value()
            .clone();

        Self::downcast(name, cache)
    }

    /// [`CacheRegistry::get_or_create`] with a JSON serializer.
    pub fn get_or_create_json<K, V>(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<Arc<CompressedCache<K, V>>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.get_or_create(name, config, Arc::new(JsonSerializer::<V>::new()))
    }

    /// Returns the cache registered under `name`, if any.
    pub fn get<K, V>(&self, name: &str) -> Result<Option<Arc<CompressedCache<K, V>>>>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let Some(existing) = self.caches.get(name).map(|c| Arc::clone(c.value())) else {
            return Ok(None);
        };
        Self::downcast(name, existing).map(Some)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// Runs the maintenance hook of every registered cache and returns the
    /// total number of slots dropped.
    pub fn clean_up_all(&self) -> usize {
        let caches: Vec<Arc<dyn RegisteredCache>> =
            self.caches.iter().map(|c| Arc::clone(c.value())).collect();
        caches.iter().map(|cache| cache.clean_up()).sum()
    }

    fn downcast<K, V>(
        name: &str,
        cache: Arc<dyn RegisteredCache>,
    ) -> Result<Arc<CompressedCache<K, V>>>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        cache
            .as_any()
            .downcast::<CompressedCache<K, V>>()
            .map_err(|_| CacheError::TypeMismatch {
                name: name.to_string(),
            })
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("caches", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntryPolicy;
    use crate::testing::Labeled;

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry = CacheRegistry::new();
        let config = CacheConfig::simple(10, EntryPolicy::Fast);

        let first = registry
            .get_or_create_json::<String, Labeled>("fast-test-simple", &config)
            .unwrap();
        first.put("v1".to_string(), Labeled::new("test", 42)).unwrap();

        // a different config on a later call is ignored
        let second = registry
            .get_or_create_json::<String, Labeled>(
                "fast-test-simple",
                &CacheConfig::simple(20, EntryPolicy::Small),
            )
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.policy(), EntryPolicy::Fast);
        assert_eq!(
            second.get(&"v1".to_string()).as_deref(),
            Some(&Labeled::new("test", 42))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let registry = CacheRegistry::new();
        let config = CacheConfig::default();

        registry
            .get_or_create_json::<String, Labeled>("typed", &config)
            .unwrap();

        let result = registry.get_or_create_json::<String, String>("typed", &config);
        assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));

        let result = registry.get::<u64, Labeled>("typed");
        assert!(matches!(result, Err(CacheError::TypeMismatch { .. })));
    }

    #[test]
    fn test_get_and_names() {
        let registry = CacheRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<String, String>("b").unwrap().is_none());

        let config = CacheConfig::default();
        registry.get_or_create_json::<String, String>("b", &config).unwrap();
        registry.get_or_create_json::<u32, String>("a", &config).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(registry.get::<String, String>("b").unwrap().is_some());
    }

    #[test]
    fn test_concurrent_creation_yields_one_instance() {
        let registry = Arc::new(CacheRegistry::new());
        let config = CacheConfig::simple(10, EntryPolicy::Small);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let config = config.clone();
                std::thread::spawn(move || {
                    registry
                        .get_or_create_json::<String, Labeled>("shared", &config)
                        .unwrap()
                })
            })
            .collect();

        let caches: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 1);
        for cache in &caches {
            assert!(Arc::ptr_eq(cache, &caches[0]));
        }
    }
}
