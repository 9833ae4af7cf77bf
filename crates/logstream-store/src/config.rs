//! Configuration for a log store

use serde::{Deserialize, Serialize};

/// Options applied when a log store opens its backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogStoreConfig {
    /// Flush every append to stable storage before it returns
    pub sync_writes: bool,
    /// Create the file (with a zero start-index header) when it is missing
    pub create_if_missing: bool,
    /// Permission bits for a newly created file (Unix only)
    pub file_mode: u32,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            sync_writes: true,
            create_if_missing: true,
            file_mode: 0o664,
        }
    }
}

impl LogStoreConfig {
    /// Set whether appends are synchronously durable
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Set whether a missing file is created
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set the permission bits for a newly created file
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogStoreConfig::default();
        assert!(config.sync_writes);
        assert!(config.create_if_missing);
        assert_eq!(config.file_mode, 0o664);
    }

    #[test]
    fn test_builder() {
        let config = LogStoreConfig::default()
            .with_sync_writes(false)
            .with_create_if_missing(false)
            .with_file_mode(0o600);
        assert!(!config.sync_writes);
        assert!(!config.create_if_missing);
        assert_eq!(config.file_mode, 0o600);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LogStoreConfig = toml::from_str("sync_writes = false").unwrap();
        assert!(!config.sync_writes);
        assert!(config.create_if_missing);
        assert_eq!(config.file_mode, 0o664);
    }
}
