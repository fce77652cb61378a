//! Value Codec
//!
//! Serializer and compressor chained into one encode/decode pipeline.

use std::fmt;
use std::sync::Arc;

use crate::codec::{Compressor, Serializer};
use crate::error::CodecError;

// == Value Codec ==
/// Encodes values as `gzip(serialize(value))` and reverses it.
pub struct ValueCodec<V> {
    serializer: Arc<dyn Serializer<V>>,
    compressor: Compressor,
}

impl<V> ValueCodec<V> {
    pub fn new(serializer: Arc<dyn Serializer<V>>, compressor: Compressor) -> Self {
        Self {
            serializer,
            compressor,
        }
    }

    /// Serializes then compresses `value`.
    pub fn encode(&self, value: &V) -> Result<Vec<u8>, CodecError> {
        let raw = self.serializer.marshal(value)?;
        self.compressor.compress(&raw)
    }

    /// Decompresses then deserializes `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<V, CodecError> {
        let raw = self.compressor.decompress(bytes)?;
        self.serializer.unmarshal(&raw)
    }
}

impl<V> fmt::Debug for ValueCodec<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueCodec")
            .field("compressor", &self.compressor)
            .finish_non_exhaustive()
    }
}
