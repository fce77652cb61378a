//! Write-once compressed payload shared by both entry policies.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use tracing::warn;

use crate::codec::ValueCodec;

// == Compressed Bytes ==
/// Compressed form of a value plus the sticky failure flag.
///
/// The bytes are published through a `OnceLock`, so concurrent readers see
/// either nothing or the complete payload.
#[derive(Debug, Default)]
pub(crate) struct CompressedBytes {
    bytes: OnceLock<Box<[u8]>>,
    failed: AtomicBool,
}

impl CompressedBytes {
    // == Compress Once ==
    /// Compresses `value` unless bytes are already present or the entry has
    /// failed. A failure marks the entry failed and leaves the bytes empty.
    pub fn compress_once<V>(&self, codec: &ValueCodec<V>, value: &V) {
        if self.bytes.get().is_some() || self.is_failed() {
            return;
        }

        match codec.encode(value) {
            Ok(encoded) => {
                // losing a racing writer keeps the first payload
                let _ = self.bytes.set(encoded.into_boxed_slice());
            }
            Err(e) => {
                warn!(error = %e, "compression failed, entry is unusable");
                self.mark_failed();
            }
        }
    }

    // == Restore ==
    /// Decodes the stored bytes. Returns `None` if there are none or the
    /// entry has failed; a decode error marks the entry failed for good.
    pub fn restore<V>(&self, codec: &ValueCodec<V>) -> Option<V> {
        if self.is_failed() {
            return None;
        }
        let bytes = self.bytes.get()?;

        match codec.decode(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "decompression failed, entry is unusable");
                self.mark_failed();
                None
            }
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.get().map(|b| &**b)
    }

    pub fn has_bytes(&self) -> bool {
        self.bytes.get().is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn mark_failed(&self) {
        self.failed.store(true, Ordering::Release);
    }
}
