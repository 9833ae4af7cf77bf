//! Delimiter-terminated record framing
//!
//! Records are raw byte strings followed by a single [`DELIMITER`] byte. There
//! is no escaping: a payload must not contain the delimiter itself.

use std::io::{self, BufRead};

/// Byte terminating every record (ASCII line feed)
pub const DELIMITER: u8 = b'\n';

/// Frame `payload` as it is stored on disk
pub fn frame_record(payload: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(payload.len() + 1);
    framed.extend_from_slice(payload);
    framed.push(DELIMITER);
    framed
}

/// Read one record, delimiter included.
///
/// Returns `None` if the stream ends before a delimiter is found, which covers
/// both a clean end of stream and a torn tail.
pub fn read_record<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    reader.read_until(DELIMITER, &mut buf)?;
    if buf.last() == Some(&DELIMITER) {
        Ok(Some(buf))
    } else {
        Ok(None)
    }
}

/// Drop the trailing delimiter, if present
pub fn strip_delimiter(record: &[u8]) -> &[u8] {
    record.strip_suffix(&[DELIMITER]).unwrap_or(record)
}

/// Whether `payload` would be split into several records on disk
pub fn contains_delimiter(payload: &[u8]) -> bool {
    payload.contains(&DELIMITER)
}
