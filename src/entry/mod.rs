//! Compressed Entry Module
//!
//! The stored form of one cache slot, in one of two policies:
//! - Fast: compressed bytes plus a weakly retained decompressed copy
//! - Small: compressed bytes only, decompressed on every read

mod bytes;
mod fast;
mod retained;
mod small;

use std::sync::Arc;

use crate::codec::ValueCodec;
use crate::config::EntryPolicy;

pub use fast::FastEntry;
pub use retained::RetainedValues;
pub use small::SmallEntry;

pub(crate) use bytes::CompressedBytes;

// == Compressed Entry ==
/// One cache slot's stored value.
///
/// Entries are compressed once, at construction, and never change their
/// logical value afterwards. A failed compression or decompression leaves the
/// entry permanently invalid.
#[derive(Debug)]
pub enum CompressedEntry<V> {
    Fast(FastEntry<V>),
    Small(SmallEntry<V>),
}

impl<V> CompressedEntry<V> {
    /// Builds an entry for `value` with the given policy, compressing it
    /// immediately. Check [`CompressedEntry::is_valid`] before storing it.
    pub fn new(
        policy: EntryPolicy,
        value: V,
        codec: Arc<ValueCodec<V>>,
        retained: &Arc<RetainedValues<V>>,
    ) -> Self {
        match policy {
            EntryPolicy::Fast => {
                CompressedEntry::Fast(FastEntry::new(value, codec, Arc::clone(retained)))
            }
            EntryPolicy::Small => CompressedEntry::Small(SmallEntry::new(value, codec)),
        }
    }

    /// Returns the decompressed value, or `None` if it can no longer be
    /// produced.
    pub fn uncompressed_value(&self) -> Option<Arc<V>> {
        match self {
            CompressedEntry::Fast(entry) => entry.uncompressed_value(),
            CompressedEntry::Small(entry) => entry.uncompressed_value(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            CompressedEntry::Fast(entry) => entry.is_valid(),
            CompressedEntry::Small(entry) => entry.is_valid(),
        }
    }

    /// Drops this entry's decompressed copy from the retention pool. Small
    /// entries retain nothing.
    pub fn release_copy(&self) {
        if let CompressedEntry::Fast(entry) = self {
            entry.release_copy();
        }
    }

    /// Size of the compressed form, if compression succeeded.
    pub fn compressed_len(&self) -> Option<usize> {
        self.compressed().bytes().map(<[u8]>::len)
    }

    pub fn policy(&self) -> EntryPolicy {
        match self {
            CompressedEntry::Fast(_) => EntryPolicy::Fast,
            CompressedEntry::Small(_) => EntryPolicy::Small,
        }
    }

    fn compressed(&self) -> &CompressedBytes {
        match self {
            CompressedEntry::Fast(entry) => entry.compressed(),
            CompressedEntry::Small(entry) => entry.compressed(),
        }
    }
}
