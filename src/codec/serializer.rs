//! Value Serializers
//!
//! A serializer turns a typed value into bytes and back. It is assumed
//! fallible in both directions.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

// == Serializer Trait ==
/// Converts values of type `V` to and from bytes.
///
/// Round trips must reproduce a value equal to the original, otherwise
/// compare-and-swap operations on the cache stop behaving sanely.
pub trait Serializer<V>: Send + Sync {
    /// Serializes `value` into bytes.
    fn marshal(&self, value: &V) -> Result<Vec<u8>, CodecError>;

    /// Rebuilds a value from bytes produced by [`Serializer::marshal`].
    fn unmarshal(&self, bytes: &[u8]) -> Result<V, CodecError>;
}

// == JSON Serializer ==
/// serde_json backed serializer for any serde type.
pub struct JsonSerializer<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> JsonSerializer<V> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V> Default for JsonSerializer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for JsonSerializer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonSerializer")
    }
}

impl<V> Serializer<V> for JsonSerializer<V>
where
    V: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &V) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Serialize(e.to_string()))
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<V, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Deserialize(e.to_string()))
    }
}
