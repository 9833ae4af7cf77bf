//! The log store
//!
//! A [`LogStore`] owns one file laid out as
//!
//! ```text
//! [8 bytes: start index, big-endian][record_0 \n][record_1 \n][...]
//! ```
//!
//! and an in-memory index from logical record index to byte offset. Every
//! operation performs blocking I/O on the single file handle and takes
//! `&mut self`: reads move the file cursor, so callers sharing a store across
//! threads must wrap it in a mutex.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use crate::config::LogStoreConfig;
use crate::error::StoreError;
use crate::header::{write_header, HEADER_LEN};
use crate::record::{contains_delimiter, frame_record, read_record, strip_delimiter};
use crate::recovery::recover;
use crate::state::LogState;

/// Single-file append-only record log
#[derive(Debug)]
pub struct LogStore {
    /// Path of the backing file
    path: PathBuf,
    /// Backing file, opened read + write
    file: File,
    /// Options the store was opened with
    config: LogStoreConfig,
    /// Logical index -> byte offset
    state: LogState,
    /// Where the next record is written
    append_offset: u64,
    /// Unterminated bytes past `append_offset`, cut off by the next append
    torn_tail_bytes: u64,
    /// Payload of the most recent record
    last_entry: Bytes,
}

impl LogStore {
    /// Open the log at `path` with default options, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(path, LogStoreConfig::default())
    }

    /// Open the log at `path`.
    ///
    /// A missing file is created holding only a zero start-index header. An
    /// existing file is scanned to rebuild the offset index; trailing bytes
    /// that do not end in a delimiter are left out of the log and overwritten
    /// by the next append. Opening never modifies an existing file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: LogStoreConfig,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if config.create_if_missing {
            match open_options(&config).create_new(true).open(&path) {
                Ok(file) => return Self::create(path, file, config),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }

        let file = open_options(&config).open(&path)?;
        Self::recover_from(path, file, config)
    }

    /// Initialize a freshly created file
    fn create(path: PathBuf, mut file: File, config: LogStoreConfig) -> Result<Self, StoreError> {
        info!("Log file doesn't exist, creating it");

        let initialized = write_header(&mut file, 0).and_then(|()| {
            if config.sync_writes {
                file.sync_all()?;
            }
            Ok(())
        });
        if let Err(e) = initialized {
            // A header-less file would fail every later open
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        Ok(Self {
            path,
            file,
            config,
            state: LogState::empty(0),
            append_offset: HEADER_LEN as u64,
            torn_tail_bytes: 0,
            last_entry: Bytes::new(),
        })
    }

    /// Rebuild the index of an existing file
    fn recover_from(path: PathBuf, mut file: File, config: LogStoreConfig) -> Result<Self, StoreError> {
        let recovered = recover(&mut file)?;

        if recovered.has_torn_tail() {
            warn!(
                offset = recovered.end_offset,
                bytes = recovered.torn_tail_bytes,
                "Ignoring unterminated tail"
            );
        }
        file.seek(SeekFrom::Start(recovered.end_offset))?;

        info!(
            start_index = ?recovered.state.start_index(),
            last_index = ?recovered.state.last_index(),
            records = recovered.state.len(),
            append_offset = recovered.end_offset,
            "Recovered log"
        );

        Ok(Self {
            path,
            file,
            config,
            state: recovered.state,
            append_offset: recovered.end_offset,
            torn_tail_bytes: recovered.torn_tail_bytes,
            last_entry: recovered.last_entry,
        })
    }

    /// Append `payload` as a new record and return its logical index.
    ///
    /// `payload` must not contain the record delimiter (`\n`); the store does
    /// not escape it, so such a payload reads back as several records after a
    /// reopen.
    ///
    /// On error the store's state is unchanged and the file is cut back to the
    /// previous append offset, so a partially written record never resurfaces
    /// after a reopen.
    pub fn append(&mut self, payload: &[u8]) -> Result<u64, StoreError> {
        if contains_delimiter(payload) {
            warn!(len = payload.len(), "Payload contains the record delimiter");
        }

        let index = self.state.next_index().ok_or(StoreError::IndexOverflow {
            start: self.state.start_index().unwrap_or_default(),
            records: self.state.len(),
        })?;
        let framed = frame_record(payload);
        let offset = self.append_offset;

        let end = match self.write_frame(offset, &framed) {
            Ok(end) => end,
            Err(e) => {
                self.rollback(offset);
                return Err(e);
            }
        };

        let pushed = self.state.push(offset);
        debug_assert_eq!(pushed, Some(index));
        self.append_offset = end;
        let mut entry = Bytes::from(framed);
        entry.truncate(payload.len());
        self.last_entry = entry;

        debug!(index, offset, "Appended record");
        Ok(index)
    }

    /// Read the payload of logical record `index`
    pub fn entry(&mut self, index: u64) -> Result<Bytes, StoreError> {
        let offset = self
            .state
            .offset_of(index)
            .ok_or_else(|| self.out_of_range(index))?;

        let read = self.read_records(offset, 1);
        let restored = self.restore_cursor();
        let mut records = read?;
        restored?;

        debug!(index, offset, "Read record");
        Ok(records.pop().unwrap_or_default())
    }

    /// Read the payloads of every record from `index` through the last one
    pub fn entries_from(&mut self, index: u64) -> Result<Vec<Bytes>, StoreError> {
        let offset = self
            .state
            .offset_of(index)
            .ok_or_else(|| self.out_of_range(index))?;
        let count = self.state.last_index().map_or(0, |last| last - index + 1);

        let read = self.read_records(offset, count);
        let restored = self.restore_cursor();
        let records = read?;
        restored?;
        Ok(records)
    }

    /// Payload of the most recent record, empty if there is none
    pub fn last_entry(&self) -> Bytes {
        self.last_entry.clone()
    }

    /// Logical index of the most recent record
    pub fn last_index(&self) -> Option<u64> {
        self.state.last_index()
    }

    /// Logical index of the first record
    pub fn start_index(&self) -> Option<u64> {
        self.state.start_index()
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Byte offset the next record will be written at
    pub fn append_offset(&self) -> u64 {
        self.append_offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &LogStoreConfig {
        &self.config
    }

    /// Flush file contents and metadata to stable storage
    pub fn sync(&self) -> Result<(), StoreError> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Sync and release the file handle
    pub fn close(self) -> Result<(), StoreError> {
        self.sync()
    }

    /// Write one framed record at `offset` and return the new end offset
    fn write_frame(&mut self, offset: u64, framed: &[u8]) -> Result<u64, StoreError> {
        if self.torn_tail_bytes > 0 {
            warn!(offset, bytes = self.torn_tail_bytes, "Truncating unterminated tail");
            self.file.set_len(offset)?;
            self.torn_tail_bytes = 0;
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(framed)?;
        if self.config.sync_writes && !cfg!(unix) {
            self.file.sync_data()?;
        }
        Ok(self.file.stream_position()?)
    }

    /// Cut off whatever a failed append left past `offset`
    fn rollback(&mut self, offset: u64) {
        if let Err(e) = self.file.set_len(offset) {
            warn!(offset, error = %e, "Failed to truncate after a failed append");
        }
    }

    /// Read `count` consecutive records starting at byte `offset`
    fn read_records(&mut self, offset: u64, count: u64) -> Result<Vec<Bytes>, StoreError> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut reader = BufReader::new(&mut self.file);
        let mut records = Vec::new();
        let mut position = offset;
        for _ in 0..count {
            let record =
                read_record(&mut reader)?.ok_or(StoreError::CorruptRecord { offset: position })?;
            position += record.len() as u64;
            records.push(Bytes::copy_from_slice(strip_delimiter(&record)));
        }
        Ok(records)
    }

    /// Put the file cursor back at the append position
    fn restore_cursor(&mut self) -> Result<(), StoreError> {
        self.file.seek(SeekFrom::Start(self.append_offset))?;
        Ok(())
    }

    fn out_of_range(&self, index: u64) -> StoreError {
        StoreError::IndexOutOfRange {
            index,
            start: self.state.start_index(),
            last: self.state.last_index(),
        }
    }
}

impl fmt::Display for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LogStore {{ start_index: {}, last_index: {}, append_offset: {}, records: {}, last_entry: {:?} }}",
            display_index(self.start_index()),
            display_index(self.last_index()),
            self.append_offset,
            self.len(),
            String::from_utf8_lossy(&self.last_entry),
        )
    }
}

fn display_index(index: Option<u64>) -> String {
    index.map_or_else(|| "none".to_string(), |i| i.to_string())
}

/// Read + write options, with synchronous writes and file mode on Unix
fn open_options(config: &LogStoreConfig) -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true).write(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(config.file_mode);
        if config.sync_writes {
            options.custom_flags(libc::O_SYNC);
        }
    }
    #[cfg(not(unix))]
    let _ = config;

    options
}
