//! Configuration Module
//!
//! Per-cache settings: entry policy, eviction bounds and compression level.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::CacheError;

// == Entry Policy ==
/// How a cache keeps the decompressed form of its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPolicy {
    /// Keep a weakly retained decompressed copy next to the compressed bytes
    #[default]
    Fast,
    /// Keep only the compressed bytes; every read decompresses
    Small,
}

impl FromStr for EntryPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(EntryPolicy::Fast),
            "small" => Ok(EntryPolicy::Small),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown entry policy '{}', expected 'fast' or 'small'",
                other
            ))),
        }
    }
}

impl fmt::Display for EntryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPolicy::Fast => f.write_str("fast"),
            EntryPolicy::Small => f.write_str("small"),
        }
    }
}

/// Cache configuration parameters.
///
/// Supplied once at cache creation and fixed for the lifetime of the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entry policy used for every value written to the cache
    pub policy: EntryPolicy,
    /// Maximum number of entries before the least recently used one is evicted
    pub max_entries: usize,
    /// Optional time-to-live applied to every entry on write
    pub time_to_live: Option<Duration>,
    /// Number of decompressed values the fast policy keeps strongly reachable
    pub retained_values: usize,
    /// gzip level, 0 (store) to 9 (best)
    pub compression_level: u32,
}

impl CacheConfig {
    /// Creates a config bounded by entry count with the given policy.
    pub fn simple(max_entries: usize, policy: EntryPolicy) -> Self {
        Self {
            policy,
            max_entries,
            ..Self::default()
        }
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_POLICY` - `fast` or `small` (default: fast)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Time-to-live in seconds, 0 disables expiry (default: 0)
    /// - `CACHE_RETAINED_VALUES` - Fast policy retained copies (default: 128)
    /// - `CACHE_COMPRESSION_LEVEL` - gzip level 0-9 (default: 6)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            policy: env::var("CACHE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.policy),
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            time_to_live: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            retained_values: env::var("CACHE_RETAINED_VALUES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retained_values),
            compression_level: env::var("CACHE_COMPRESSION_LEVEL")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|level| *level <= 9)
                .unwrap_or(defaults.compression_level),
        }
    }

    /// Sets the time-to-live applied to every entry.
    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Sets how many decompressed values the fast policy keeps reachable.
    pub fn with_retained_values(mut self, retained_values: usize) -> Self {
        self.retained_values = retained_values;
        self
    }

    /// Sets the gzip level, clamped to 9.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: EntryPolicy::Fast,
            max_entries: 1000,
            time_to_live: None,
            retained_values: 128,
            compression_level: 6,
        }
    }
}
