//! # LogStream Store
//!
//! Single-file, append-only record log used as the durable storage layer
//! underneath a consensus log. Records are appended in order, never mutated,
//! and read back by logical index or as "last entry".
//!
//! ## Features
//!
//! - **LogStore**: create-or-recover a log file, append records, read by index
//! - **Recovery**: rebuilds the in-memory offset index by scanning the file;
//!   an unterminated tail left by a torn write is dropped, not reported
//! - **Synchronous durability**: appends are flushed to stable storage before
//!   they return (configurable via [`LogStoreConfig`])
//!
//! ## Storage Format
//!
//! ```text
//! [8 bytes: start index, big-endian][payload \n][payload \n][...]
//! ```
//!
//! Payloads must not contain `\n`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use logstream_store::LogStore;
//!
//! # fn main() -> Result<(), logstream_store::StoreError> {
//! let mut store = LogStore::open("/tmp/raft.log")?;
//! let index = store.append(b"hello")?;
//! assert_eq!(&store.entry(index)?[..], b"hello");
//! assert_eq!(store.last_index(), Some(index));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod header;
pub mod record;
pub mod recovery;
pub mod state;
pub mod store;

// Re-exports
pub use config::LogStoreConfig;
pub use error::StoreError;
pub use header::{decode_header, encode_header, HEADER_LEN};
pub use record::DELIMITER;
pub use recovery::Recovered;
pub use state::LogState;
pub use store::LogStore;
