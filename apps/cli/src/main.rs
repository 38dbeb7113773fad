#![allow(clippy::print_stderr, clippy::print_stdout)]

mod args;
mod handlers;

use crate::args::{Cli, Command};
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use trellis_logger::Logger;
use trellis_settings::SettingsError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<SettingsError>() {
                Some(settings_err) => {
                    let entry = settings_err.entry().unwrap_or("-");
                    eprintln!("error[{}]: {entry}", settings_err.kind());
                    eprintln!("  {settings_err}");
                },
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let _logger = Logger::builder("trellis").level(cli.log_level).format(cli.log_format).init()?;

    match &cli.command {
        Command::Check {} => handlers::check(&cli.settings_path())?,
        Command::Show { json } => handlers::show(&cli.settings_path(), *json)?,
        Command::Flags {} => handlers::flags(),
    }

    Ok(())
}
