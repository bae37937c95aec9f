//! Snapshot loading: whole-file read, byte-order reversal, decompression.
//!
//! The snapshot stores its bytes in reverse order relative to a standard
//! zlib stream. Loading is two stages with no partial-read tolerance: the
//! entire file is read and reversed, then the reversed buffer is inflated
//! into the raw serialized-graph stream.

use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use tracing::debug;

use crate::error::{GparamsError, Result};

/// Read the entire snapshot file and reverse its byte order.
///
/// # Errors
/// Returns [`GparamsError::Io`] if the file is missing or unreadable.
pub fn read_reversed<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let mut data = fs::read(path.as_ref())?;
    data.reverse();
    debug!(
        path = %path.as_ref().display(),
        bytes = data.len(),
        "Snapshot read and reversed"
    );
    Ok(data)
}

/// Decompress a reversed snapshot buffer into the serialized-graph stream.
///
/// # Errors
/// Returns [`GparamsError::Decompress`] if the buffer is not a valid zlib
/// stream. The transform is deterministic, so failure always indicates a
/// format mismatch and is never retried.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut stream = Vec::new();
    decoder
        .read_to_end(&mut stream)
        .map_err(|e| GparamsError::Decompress(e.to_string()))?;
    debug!(
        compressed = data.len(),
        decompressed = stream.len(),
        "Snapshot decompressed"
    );
    Ok(stream)
}

/// Read, reverse and decompress the snapshot at `path` in one call.
///
/// # Errors
/// Returns [`GparamsError::Io`] or [`GparamsError::Decompress`] as above.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let reversed = read_reversed(path)?;
    inflate(&reversed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
