// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `compatrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "compatrun",
    version,
    about = "Check that resources created by a previous release survive the current binary.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the scenario file (TOML).
    ///
    /// Default: `Compat.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Compat.toml")]
    pub config: String,

    /// Path to the current binary; overrides `[binaries].current`.
    #[arg(long, value_name = "PATH")]
    pub current: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `COMPATRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the step plan, but don't launch anything.
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
