//! Compressed Cache - A bounded in-memory cache that stores values compressed
//!
//! Values are serialized and gzip-compressed on write, then restored on read.
//! Two entry policies trade memory for latency: `Fast` keeps a weakly
//! retained decompressed copy, `Small` keeps only the compressed bytes.

pub mod cache;
pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod facade;
pub mod registry;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use cache::{BoundedCache, BoundedStore, CacheStats};
pub use codec::{Compressor, JsonSerializer, Serializer, ValueCodec};
pub use config::{CacheConfig, EntryPolicy};
pub use entry::{CompressedEntry, RetainedValues};
pub use error::{CacheError, CodecError, Result};
pub use facade::{CompressedCache, EntryRef};
pub use registry::{CacheRegistry, RegisteredCache};
pub use tasks::spawn_maintenance_task;
