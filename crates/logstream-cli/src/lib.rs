//! Command-line driver for LogStream log files
//!
//! Opens a log by path and appends to, reads from, or describes it.

pub mod commands;
pub mod config;

pub use commands::run;
pub use config::{Cli, CliConfig, Command};
