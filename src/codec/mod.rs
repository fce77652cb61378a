//! Codec Module
//!
//! Turns values into compressed bytes and back: a pluggable serializer
//! followed by a gzip stream.

mod compressor;
mod serializer;
mod value;

pub use compressor::Compressor;
pub use serializer::{JsonSerializer, Serializer};
pub use value::ValueCodec;
