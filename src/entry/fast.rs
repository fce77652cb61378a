//! Fast Entry Policy
//!
//! Compressed bytes plus a weakly retained decompressed copy. Hot reads hand
//! out the live copy; once it has been reclaimed, the next read decompresses
//! and refreshes it.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use crate::codec::ValueCodec;
use crate::entry::{CompressedBytes, RetainedValues};

// == Fast Entry ==
/// Entry that minimizes read latency for hot keys.
pub struct FastEntry<V> {
    compressed: CompressedBytes,
    cached: RwLock<Weak<V>>,
    codec: Arc<ValueCodec<V>>,
    retained: Arc<RetainedValues<V>>,
}

impl<V> FastEntry<V> {
    /// Wraps `value`, compresses it once and hands the live copy to the
    /// retention pool. A value that failed to compress is not retained.
    pub fn new(value: V, codec: Arc<ValueCodec<V>>, retained: Arc<RetainedValues<V>>) -> Self {
        let value = Arc::new(value);
        let entry = Self {
            compressed: CompressedBytes::default(),
            cached: RwLock::new(Arc::downgrade(&value)),
            codec,
            retained,
        };

        entry.compressed.compress_once(&*entry.codec, &*value);
        if !entry.compressed.is_failed() {
            entry.retained.retain(value);
        }
        entry
    }

    // == Uncompressed Value ==
    /// Returns the live copy if it is still reachable, otherwise restores
    /// the value from the compressed bytes.
    pub fn uncompressed_value(&self) -> Option<Arc<V>> {
        if self.compressed.is_failed() {
            return None;
        }
        if let Some(value) = self.cached.read().upgrade() {
            return Some(value);
        }

        let mut cached = self.cached.write();
        // another reader may have restored it while we waited
        if let Some(value) = cached.upgrade() {
            return Some(value);
        }

        let value = Arc::new(self.compressed.restore(&*self.codec)?);
        debug!("cold read, value restored from compressed bytes");
        *cached = Arc::downgrade(&value);
        drop(cached);

        self.retained.retain(Arc::clone(&value));
        Some(value)
    }

    pub fn is_valid(&self) -> bool {
        if self.compressed.is_failed() {
            return false;
        }
        self.compressed.has_bytes() || self.cached.read().strong_count() > 0
    }

    /// Whether the decompressed copy is currently reachable.
    pub fn has_live_copy(&self) -> bool {
        self.cached.read().strong_count() > 0
    }

    /// Hands the live copy back out of the retention pool, so it is
    /// reclaimed once callers drop it.
    pub fn release_copy(&self) {
        let live = self.cached.read().upgrade();
        if let Some(value) = live {
            self.retained.release(&value);
        }
    }

    pub(crate) fn compressed(&self) -> &CompressedBytes {
        &self.compressed
    }
}

impl<V> fmt::Debug for FastEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEntry")
            .field("compressed_len", &self.compressed.bytes().map(<[u8]>::len))
            .field("failed", &self.compressed.is_failed())
            .field("live_copy", &self.has_live_copy())
            .finish()
    }
}
