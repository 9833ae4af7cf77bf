//! Append failures part way through a write
//!
//! Lowers `RLIMIT_FSIZE` so the kernel accepts only part of a record. The
//! limit is process-wide, so this file holds a single test in its own binary.

#![cfg(target_os = "linux")]

use std::fs;

use logstream_logging::init_testing;
use logstream_store::{LogStore, LogStoreConfig};
use tempfile::TempDir;

fn file_size_limit() -> libc::rlimit {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let rc = unsafe { libc::getrlimit(libc::RLIMIT_FSIZE, &mut limit) };
    assert_eq!(rc, 0);
    limit
}

fn set_file_size_limit(limit: &libc::rlimit) {
    let rc = unsafe { libc::setrlimit(libc::RLIMIT_FSIZE, limit) };
    assert_eq!(rc, 0);
}

/// A short write is cut back off the file and never shows up after reopen
#[test]
fn test_short_write_is_rolled_back() {
    init_testing();
    // Exceeding the limit must fail the write instead of killing the process
    unsafe {
        libc::signal(libc::SIGXFSZ, libc::SIG_IGN);
    }

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("raft.log");
    let config = LogStoreConfig::default().with_sync_writes(false);

    let mut store = LogStore::open_with_config(&path, config.clone()).unwrap();
    assert_eq!(store.append(b"first").unwrap(), 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 14);

    let original = file_size_limit();
    set_file_size_limit(&libc::rlimit {
        rlim_cur: 20,
        rlim_max: original.rlim_max,
    });
    let result = store.append(b"helloworld");
    set_file_size_limit(&original);

    assert!(result.is_err());
    assert_eq!(store.last_index(), Some(0));
    assert_eq!(store.append_offset(), 14);
    assert_eq!(&store.last_entry()[..], b"first");
    assert_eq!(fs::metadata(&path).unwrap().len(), 14);

    assert_eq!(store.append(b"ab").unwrap(), 1);
    drop(store);

    let mut store = LogStore::open_with_config(&path, config).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(&store.entry(0).unwrap()[..], b"first");
    assert_eq!(&store.entry(1).unwrap()[..], b"ab");
}
