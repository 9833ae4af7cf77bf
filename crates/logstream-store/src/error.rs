//! Error types for logstream-store

use thiserror::Error;

/// Errors that can occur while opening, appending to, or reading a log store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Creating, opening, reading, writing or seeking the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is too short to hold the start-index header
    #[error("corrupt header: expected 8 bytes, found {found}")]
    CorruptHeader {
        /// Number of header bytes actually available
        found: usize,
    },

    /// The requested logical index is outside `[start, last]`
    #[error("index {index} out of range (start: {start:?}, last: {last:?})")]
    IndexOutOfRange {
        /// Requested logical index
        index: u64,
        /// First logical index held by the store, `None` when empty
        start: Option<u64>,
        /// Last logical index held by the store, `None` when empty
        last: Option<u64>,
    },

    /// Another record would need a logical index past `u64::MAX`
    #[error("log index space exhausted (start: {start}, records: {records})")]
    IndexOverflow {
        /// Logical index of the first record
        start: u64,
        /// Number of records already held
        records: usize,
    },

    /// An indexed offset no longer holds a delimiter-terminated record
    #[error("corrupt record at byte offset {offset}")]
    CorruptRecord {
        /// Byte offset recorded in the in-memory index
        offset: u64,
    },
}

impl StoreError {
    /// Whether this error is a range check failure rather than a storage fault
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::IndexOutOfRange { .. })
    }
}
