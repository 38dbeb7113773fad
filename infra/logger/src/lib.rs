//! # Logger
//!
//! Process-wide `tracing` setup for the Trellis binaries.
//!
//! Console output always goes to **stderr** so that commands can print their
//! results on stdout. An optional rolling log file can be added with
//! [`LoggerBuilder::file`]; file-only options such as [`LoggerBuilder::rotation`]
//! exist only once a file has been configured.
//!
//! `RUST_LOG` overrides the configured level unless an explicit filter is given
//! with [`LoggerBuilder::env_filter`].
//!
//! ## Example
//!
//! ```rust
//! # use trellis_logger::{LevelFilter, LogFormat, Logger};
//!
//! let _logger = Logger::builder("trellis")
//!     .level(LevelFilter::DEBUG)
//!     .format(LogFormat::Compact)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;
use strum_macros::{Display, EnumString};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 5;
const LOG_FILE_SUFFIX: &str = "log";

/// Line format of emitted events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Single line per event, colored on the console.
    #[default]
    Compact,
    /// Multi-line, human oriented.
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug)]
struct LoggerConfig {
    name: String,
    console: bool,
    format: LogFormat,
    level: LevelFilter,
    env_filter: Option<String>,
    dir: Option<PathBuf>,
    rotation: Rotation,
    max_files: usize,
}

#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile;

mod private {
    pub trait Sealed {}
}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// Configures and installs the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<F: Sealed = NoFile> {
    config: LoggerConfig,
    file: PhantomData<F>,
}

impl<F: Sealed> LoggerBuilder<F> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Explicit directives (e.g. `trellis_settings=debug`) replacing `RUST_LOG`.
    ///
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file writer's worker; keep it alive until
    /// the process exits or buffered lines are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`,
    ///   a bad filter, or when neither console nor file output is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory is unusable.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let config = self.config;
        validate_config(&config)?;

        let env_filter = build_env_filter(&config)?;
        let mut layers = Vec::new();

        if config.console {
            let console = layer().with_writer(io::stderr);
            layers.push(match config.format {
                LogFormat::Compact => console.compact().with_ansi(true).boxed(),
                LogFormat::Pretty => console.pretty().with_ansi(true).boxed(),
                LogFormat::Json => console.json().with_ansi(false).boxed(),
            });
        }

        let guard = if let Some(dir) = &config.dir {
            fs::create_dir_all(dir)
                .context(format!("Failed to create log directory: {}", dir.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(config.rotation.clone())
                .filename_prefix(&config.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(config.max_files)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let file = layer().with_writer(writer).with_ansi(false);
            layers.push(match config.format {
                LogFormat::Json => file.json().boxed(),
                LogFormat::Compact | LogFormat::Pretty => file.boxed(),
            });
            Some(guard)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No output enabled. Enable the console or configure a log file.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard, dir: config.dir })
    }
}

impl LoggerBuilder<NoFile> {
    /// Additionally writes to rolling files named `<name>.<date>.log` in `dir`.
    pub fn file(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithFile> {
        let mut config = self.config;
        config.dir = Some(dir.into());
        LoggerBuilder { config, file: PhantomData }
    }
}

impl LoggerBuilder<WithFile> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Number of rotated files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }
}

/// Handle to the installed logging system.
#[must_use = "Dropping this handle stops the background file writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
    dir: Option<PathBuf>,
}

impl Logger {
    /// Starts a builder. `name` prefixes log file names.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            config: LoggerConfig {
                name: name.into(),
                console: true,
                format: LogFormat::default(),
                level: LevelFilter::INFO,
                env_filter: None,
                dir: None,
                rotation: Rotation::DAILY,
                max_files: DEFAULT_MAX_FILES,
            },
            file: PhantomData,
        }
    }

    /// Directory receiving log files, if file output is enabled.
    #[must_use]
    pub fn log_dir(&self) -> Option<&std::path::Path> {
        self.dir.as_deref()
    }

    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

fn validate_config(config: &LoggerConfig) -> Result<(), LoggerError> {
    if config.name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }
    if config.dir.is_some() && config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
