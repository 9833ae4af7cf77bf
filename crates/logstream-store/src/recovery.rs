//! Rebuilding the offset index from an existing file

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use bytes::Bytes;

use crate::error::StoreError;
use crate::header::{read_header, HEADER_LEN};
use crate::record::DELIMITER;
use crate::state::LogState;

/// Result of scanning an existing log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// Offset index rebuilt from complete records
    pub state: LogState,
    /// Payload of the last complete record, empty if there is none
    pub last_entry: Bytes,
    /// Byte offset just past the last complete record
    pub end_offset: u64,
    /// Bytes after `end_offset` that do not form a complete record
    pub torn_tail_bytes: u64,
}

impl Recovered {
    pub fn has_torn_tail(&self) -> bool {
        self.torn_tail_bytes > 0
    }
}

/// Scan `file` from the start: decode the header, then index every
/// delimiter-terminated record. Scanning stops at the first record without a
/// delimiter; those bytes are reported as a torn tail, not as an error.
///
/// Record bytes are never accumulated while scanning, so memory use does not
/// depend on record or tail size. Only the last complete record is read back.
pub fn recover<F: Read + Seek>(file: &mut F) -> Result<Recovered, StoreError> {
    file.seek(SeekFrom::Start(0))?;
    let base = read_header(file)?;

    let mut state = LogState::empty(base);
    // Start offset and length (delimiter included) of the last complete record
    let mut last_record: Option<(u64, u64)> = None;
    let mut record_start = HEADER_LEN as u64;
    let mut position = record_start;

    {
        let mut reader = BufReader::new(&mut *file);
        loop {
            let (consumed, terminated) = {
                let buf = reader.fill_buf()?;
                if buf.is_empty() {
                    break;
                }
                match buf.iter().position(|&b| b == DELIMITER) {
                    Some(i) => (i + 1, true),
                    None => (buf.len(), false),
                }
            };
            reader.consume(consumed);
            position += consumed as u64;

            if terminated {
                state
                    .push(record_start)
                    .ok_or_else(|| StoreError::IndexOverflow {
                        start: base,
                        records: state.len(),
                    })?;
                last_record = Some((record_start, position - record_start));
                record_start = position;
            }
        }
    }

    let last_entry = match last_record {
        Some((offset, len)) => {
            file.seek(SeekFrom::Start(offset))?;
            let mut payload = vec![0u8; (len - 1) as usize];
            file.read_exact(&mut payload)?;
            Bytes::from(payload)
        }
        None => Bytes::new(),
    };

    Ok(Recovered {
        state,
        last_entry,
        end_offset: record_start,
        torn_tail_bytes: position - record_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::encode_header;
    use std::io::Cursor;

    fn log_bytes(start: u64, body: &[u8]) -> Cursor<Vec<u8>> {
        let mut bytes = encode_header(start).to_vec();
        bytes.extend_from_slice(body);
        Cursor::new(bytes)
    }

    #[test]
    fn test_header_only() {
        let recovered = recover(&mut log_bytes(0, b"")).unwrap();
        assert_eq!(recovered.state, LogState::empty(0));
        assert!(recovered.last_entry.is_empty());
        assert_eq!(recovered.end_offset, 8);
        assert!(!recovered.has_torn_tail());
    }

    #[test]
    fn test_complete_records() {
        let recovered = recover(&mut log_bytes(0, b"hello\nworld\n")).unwrap();
        assert_eq!(
            recovered.state,
            LogState::NonEmpty {
                start: 0,
                offsets: vec![8, 14]
            }
        );
        assert_eq!(&recovered.last_entry[..], b"world");
        assert_eq!(recovered.end_offset, 20);
        assert_eq!(recovered.torn_tail_bytes, 0);
    }

    #[test]
    fn test_torn_tail_excluded() {
        let recovered = recover(&mut log_bytes(0, b"a\nbb\nccc")).unwrap();
        assert_eq!(recovered.state.last_index(), Some(1));
        assert_eq!(&recovered.last_entry[..], b"bb");
        assert_eq!(recovered.end_offset, 13);
        assert_eq!(recovered.torn_tail_bytes, 3);
    }

    #[test]
    fn test_persisted_start_index() {
        let recovered = recover(&mut log_bytes(50, b"x\ny\n")).unwrap();
        assert_eq!(recovered.state.start_index(), Some(50));
        assert_eq!(recovered.state.last_index(), Some(51));
    }

    #[test]
    fn test_empty_with_nonzero_header() {
        let recovered = recover(&mut log_bytes(50, b"")).unwrap();
        assert_eq!(recovered.state, LogState::empty(50));
        assert_eq!(recovered.state.last_index(), None);
    }

    #[test]
    fn test_short_header() {
        let err = recover(&mut Cursor::new(vec![0u8; 5])).unwrap_err();
        assert!(matches!(err, StoreError::CorruptHeader { found: 5 }));
    }

    #[test]
    fn test_last_index_at_u64_max() {
        let recovered = recover(&mut log_bytes(u64::MAX - 1, b"a\nb\n")).unwrap();
        assert_eq!(recovered.state.start_index(), Some(u64::MAX - 1));
        assert_eq!(recovered.state.last_index(), Some(u64::MAX));
        assert_eq!(&recovered.last_entry[..], b"b");
    }

    #[test]
    fn test_records_past_u64_max() {
        let err = recover(&mut log_bytes(u64::MAX, b"a\nb\n")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::IndexOverflow {
                start: u64::MAX,
                records: 1
            }
        ));
    }

    #[test]
    fn test_records_larger_than_read_buffer() {
        let big = vec![b'x'; 20_000];
        let mut body = big.clone();
        body.push(DELIMITER);
        body.extend_from_slice(b"small\n");
        body.extend(std::iter::repeat_n(b'y', 30_000));

        let recovered = recover(&mut log_bytes(0, &body)).unwrap();
        assert_eq!(
            recovered.state,
            LogState::NonEmpty {
                start: 0,
                offsets: vec![8, 8 + 20_001]
            }
        );
        assert_eq!(&recovered.last_entry[..], b"small");
        assert_eq!(recovered.end_offset, 8 + 20_001 + 6);
        assert_eq!(recovered.torn_tail_bytes, 30_000);
    }
}
