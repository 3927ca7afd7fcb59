//! Zlib stream codec used for loose objects and pack entries.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::repo::{Error, Result};

/// Compress `data` as a single zlib stream at the fastest level, which is
/// what command-line git uses for loose objects (`core.looseCompression`).
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Compression::fast());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress one zlib stream from the start of `data`.
///
/// Bytes following the end of the stream are ignored, so this can be
/// pointed at a pack entry without knowing its compressed length.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::MalformedObject(format!("zlib stream: {}", e)))?;
    Ok(out)
}
