//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use trellis_logger::{LevelFilter, LogFormat};
use trellis_settings::SETTINGS_FILE;

#[derive(Debug, Parser)]
#[command(name = "trellis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Validate and inspect build settings")]
pub(crate) struct Cli {
    /// Settings file, or a directory containing one
    #[arg(short = 'f', long = "file", global = true, default_value = SETTINGS_FILE)]
    pub(crate) file: PathBuf,

    /// Minimum level of diagnostics written to stderr (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "info", value_parser = LevelFilter::from_str)]
    pub(crate) log_level: LevelFilter,

    /// Diagnostic line format: compact, pretty or json
    #[arg(long, global = true, default_value = "compact", value_parser = LogFormat::from_str)]
    pub(crate) log_format: LogFormat,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Evaluate the settings and report the first error, if any
    Check {},
    /// Evaluate the settings and print the finalized result
    Show {
        /// Print the handoff object as pretty JSON
        #[arg(long)]
        json: bool,
    },
    /// List the recognized feature previews
    Flags {},
}

impl Cli {
    /// The settings file to load, resolving a directory to its settings file.
    #[must_use]
    pub(crate) fn settings_path(&self) -> PathBuf {
        if self.file.is_dir() { self.file.join(SETTINGS_FILE) } else { self.file.clone() }
    }
}
