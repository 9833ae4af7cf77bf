use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use logstream_logging::LogConfig;
use logstream_store::LogStoreConfig;
use serde::{Deserialize, Serialize};

/// Settings read from an optional TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Options for opening the log file
    pub store: LogStoreConfig,
    /// Logging setup
    pub logging: LogConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        let mut logging = LogConfig::default();
        logging.default_level = "warn".to_string();
        logging.console.stderr = true;
        Self {
            store: LogStoreConfig::default(),
            logging,
        }
    }
}

impl CliConfig {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, Parser)]
#[command(name = "logstream", about = "Append to and inspect a LogStream log file")]
pub struct Cli {
    /// TOML config file with [store] and [logging] tables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Human-readable log output instead of JSON lines
    #[arg(long, global = true)]
    pub pretty: bool,
    /// Don't wait for appends to reach stable storage
    #[arg(long, global = true)]
    pub no_sync: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show start index, last index, append offset and last entry
    Info {
        /// Log file path
        path: PathBuf,
    },
    /// Append one record per payload
    Append {
        /// Log file path (created if missing)
        path: PathBuf,
        /// Payloads to append, in order
        #[arg(required = true)]
        payloads: Vec<String>,
    },
    /// Print the record at a logical index
    Get {
        /// Log file path
        path: PathBuf,
        /// Logical index
        index: u64,
    },
    /// Print the last record and its index
    Last {
        /// Log file path
        path: PathBuf,
    },
    /// Print every record, one per line, prefixed by its index
    Dump {
        /// Log file path
        path: PathBuf,
        /// First index to print (defaults to the start of the log)
        #[arg(long)]
        from: Option<u64>,
    },
}

impl Cli {
    /// Config file contents (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        if let Some(level) = &self.log_level {
            config.logging.default_level = level.clone();
        }
        if self.pretty {
            config.logging.console.pretty = true;
        }
        if self.no_sync {
            config.store.sync_writes = false;
        }
        Ok(config)
    }
}
