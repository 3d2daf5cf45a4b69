// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::loader::DEFAULT_CONFIG_PATH;

/// Command-line arguments for `pulse`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pulse",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None,
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Path to the config file (JSON, or TOML when the extension is `.toml`).
    ///
    /// A missing file is not an error; built-in defaults are used instead.
    #[arg(short = 'c', long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Print version information and exit.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PULSE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration, but don't build, run or watch.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
