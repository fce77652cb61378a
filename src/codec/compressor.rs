//! Gzip Compressor
//!
//! Stream-based lossless compression backed by flate2.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::CodecError;

// == Compressor ==
/// gzip codec used by every compressed entry of a cache.
#[derive(Debug, Clone, Copy)]
pub struct Compressor {
    level: Compression,
}

impl Compressor {
    /// Creates a compressor with the given gzip level (clamped to 0..=9).
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }

    // == Compress ==
    /// Compresses `bytes` into a complete gzip member.
    ///
    /// The encoder is finished before returning, so the output always carries
    /// the gzip trailer.
    pub fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2 + 32), self.level);
        encoder.write_all(bytes).map_err(CodecError::Compress)?;
        encoder.finish().map_err(CodecError::Compress)
    }

    // == Decompress ==
    /// Inflates a gzip member produced by [`Compressor::compress`].
    pub fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut decoder = GzDecoder::new(bytes);
        let mut output = Vec::with_capacity(bytes.len() * 2);
        decoder
            .read_to_end(&mut output)
            .map_err(CodecError::Decompress)?;
        Ok(output)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}
