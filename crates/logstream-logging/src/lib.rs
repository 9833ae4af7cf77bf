//! Structured logging setup for LogStream
//!
//! Installs a global `tracing` subscriber writing either JSON lines (default)
//! or pretty human-readable output to the console, and optionally JSON lines
//! to a log file.
//!
//! # Quick Start
//!
//! ```ignore
//! use logstream_logging::{LogConfig, LogStreamSubscriberBuilder};
//!
//! // JSONL to console
//! LogStreamSubscriberBuilder::new().init();
//!
//! // Development mode with pretty output
//! LogStreamSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init();
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    /// A global subscriber is already installed
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Builder for configuring and initializing the logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::development()`
/// for human-readable pretty output during development.
pub struct LogStreamSubscriberBuilder {
    config: LogConfig,
}

impl LogStreamSubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Use pretty (true) or JSONL (false) console output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self
    }

    /// Send console output to stderr, leaving stdout for program output
    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.config.console.stderr = stderr;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Initialize the subscriber globally
    ///
    /// Returns a guard that must be kept alive for the duration of the
    /// program when file output is enabled.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber has already been set or the log file
    /// cannot be created.
    pub fn init(self) -> Option<WorkerGuard> {
        match self.try_init() {
            Ok(guard) => guard,
            Err(e) => panic!("failed to initialize logging: {e}"),
        }
    }

    /// Try to initialize the subscriber globally
    pub fn try_init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if self.config.console.enabled {
            layers.push(self.console_layer());
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = file_writer(file_config)?;
            guard = Some(file_guard);
            layers.push(self.jsonl_layer(writer));
        }

        Registry::default()
            .with(layers)
            .with(env_filter)
            .try_init()?;

        Ok(guard)
    }

    fn console_layer(&self) -> BoxedLayer {
        if self.config.console.stderr {
            self.console_layer_with(std::io::stderr)
        } else {
            self.console_layer_with(std::io::stdout)
        }
    }

    fn console_layer_with<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        if self.config.console.pretty {
            fmt::layer()
                .with_ansi(self.config.console.ansi)
                .with_target(true)
                .with_writer(writer)
                .boxed()
        } else {
            self.jsonl_layer(writer)
        }
    }

    fn jsonl_layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let jsonl = &self.config.jsonl;
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(jsonl.include_spans)
            .flatten_event(jsonl.flatten_events)
            .with_file(jsonl.include_location)
            .with_line_number(jsonl.include_location)
            .with_writer(writer)
            .boxed()
    }
}

impl Default for LogStreamSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking writer for file output; `Never` truncates a single file
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let file = File::create(config.directory.join(format!("{}.log", config.prefix)))?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging for testing (minimal output); ignores a subscriber
/// that is already installed
pub fn init_testing() {
    let _ = LogStreamSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .try_init();
}
