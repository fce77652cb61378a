//! Error types for the compressed cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Codec Error Enum ==
/// Failure of a single serialize/compress or decompress/deserialize step.
///
/// Codec errors never leave the entry that produced them: the entry logs
/// the error and flips into its sticky failed state instead.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The value could not be turned into bytes
    #[error("Serialization failed: {0}")]
    Serialize(String),

    /// The bytes could not be turned back into a value
    #[error("Deserialization failed: {0}")]
    Deserialize(String),

    /// The compression stream could not be written or finalized
    #[error("Compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The compressed stream is truncated or corrupt
    #[error("Decompression failed: {0}")]
    Decompress(#[source] std::io::Error),
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A write could not compress the value; the slot keeps its previous state
    #[error("it wasn't possible to compress and store the given value for {key}")]
    CompressionFailure { key: String },

    /// A stored value could not be restored
    #[error("it wasn't possible to restore the stored value for {key}")]
    DecompressionFailure { key: String },

    /// Operation outside of the supported store contract
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A cache with this name already exists for other key/value types
    #[error("Cache '{name}' is registered with different key or value types")]
    TypeMismatch { name: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Builds a `CompressionFailure` naming the given key.
    pub(crate) fn compression_failure(key: &impl std::fmt::Debug) -> Self {
        CacheError::CompressionFailure {
            key: format!("{:?}", key),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
