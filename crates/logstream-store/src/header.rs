//! Fixed-size file header
//!
//! The first [`HEADER_LEN`] bytes of a log file hold the logical index of the
//! first record as an unsigned 64-bit big-endian integer. It is written once,
//! when the file is created.

use std::io::{ErrorKind, Read, Write};

use crate::error::StoreError;

/// Size of the on-disk header in bytes
pub const HEADER_LEN: usize = 8;

/// Encode a start index as a header
pub fn encode_header(start: u64) -> [u8; HEADER_LEN] {
    start.to_be_bytes()
}

/// Decode a start index from the first [`HEADER_LEN`] bytes of `bytes`
pub fn decode_header(bytes: &[u8]) -> Result<u64, StoreError> {
    let header: [u8; HEADER_LEN] = bytes
        .get(..HEADER_LEN)
        .and_then(|b| b.try_into().ok())
        .ok_or(StoreError::CorruptHeader { found: bytes.len() })?;
    Ok(u64::from_be_bytes(header))
}

/// Read exactly one header from `reader`, leaving it positioned at the first
/// record byte.
pub fn read_header<R: Read>(reader: &mut R) -> Result<u64, StoreError> {
    let mut buf = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    decode_header(&buf[..filled])
}

/// Write the header for `start` to `writer`
pub fn write_header<W: Write>(writer: &mut W, start: u64) -> Result<(), StoreError> {
    writer.write_all(&encode_header(start))?;
    Ok(())
}
