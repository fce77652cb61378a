//! Small Entry Policy
//!
//! Only the compressed bytes are kept; every read decompresses.

use std::fmt;
use std::sync::Arc;

use crate::codec::ValueCodec;
use crate::entry::CompressedBytes;

// == Small Entry ==
/// Entry that minimizes resident memory.
pub struct SmallEntry<V> {
    compressed: CompressedBytes,
    codec: Arc<ValueCodec<V>>,
}

impl<V> SmallEntry<V> {
    /// Compresses `value` right away; the value itself is not kept.
    pub fn new(value: V, codec: Arc<ValueCodec<V>>) -> Self {
        let entry = Self {
            compressed: CompressedBytes::default(),
            codec,
        };
        entry.compressed.compress_once(&*entry.codec, &value);
        entry
    }

    /// Decompresses a fresh copy of the value.
    pub fn uncompressed_value(&self) -> Option<Arc<V>> {
        if !self.compressed.has_bytes() {
            return None;
        }
        self.compressed.restore(&*self.codec).map(Arc::new)
    }

    pub fn is_valid(&self) -> bool {
        !self.compressed.is_failed() && self.compressed.has_bytes()
    }

    pub(crate) fn compressed(&self) -> &CompressedBytes {
        &self.compressed
    }
}

impl<V> fmt::Debug for SmallEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmallEntry")
            .field("compressed_len", &self.compressed.bytes().map(<[u8]>::len))
            .field("failed", &self.compressed.is_failed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Compressor;
    use crate::testing::{FlakySerializer, Labeled};

    fn setup() -> (Arc<FlakySerializer>, Arc<ValueCodec<Labeled>>) {
        let serializer = Arc::new(FlakySerializer::default());
        let codec = Arc::new(ValueCodec::<Labeled>::new(serializer.clone(), Compressor::default()));
        (serializer, codec)
    }

    #[test]
    fn test_small_entry_roundtrip() {
        let (_, codec) = setup();
        let entry = SmallEntry::new(Labeled::new("test", 42), codec);

        assert!(entry.is_valid());
        assert_eq!(
            entry.uncompressed_value().as_deref(),
            Some(&Labeled::new("test", 42))
        );
    }

    #[test]
    fn test_small_entry_reads_are_independent_copies() {
        let (_, codec) = setup();
        let entry = SmallEntry::new(Labeled::new("test", 42), codec);

        let first = entry.uncompressed_value().unwrap();
        let second = entry.uncompressed_value().unwrap();
        assert_eq!(first, second);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_small_entry_compression_failure() {
        let (serializer, codec) = setup();
        serializer.set_fail_marshal(true);

        let entry = SmallEntry::new(Labeled::new("test", 42), codec);
        assert!(!entry.is_valid());
        assert!(entry.uncompressed_value().is_none());
    }

    #[test]
    fn test_small_entry_decompression_failure_is_sticky() {
        let (serializer, codec) = setup();
        let entry = SmallEntry::new(Labeled::new("test", 42), codec);

        serializer.set_fail_unmarshal(true);
        assert!(entry.uncompressed_value().is_none());
        assert!(!entry.is_valid());

        serializer.set_fail_unmarshal(false);
        assert!(entry.uncompressed_value().is_none());
        assert!(!entry.is_valid());
    }
}
