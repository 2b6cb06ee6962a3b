// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `sqldag`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "sqldag",
    version,
    about = "Execute a dependency plan of SQL and analysis steps against a SQLite database.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sqldag.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file. Overrides `[database].path`.
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// DDL script used to recreate the database before the run.
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Plan document (JSON). When omitted the plan is requested from the
    /// responses script.
    #[arg(long, value_name = "PATH")]
    pub plan: Option<PathBuf>,

    /// Recorded collaborator responses (JSON script).
    #[arg(long, value_name = "PATH")]
    pub responses: Option<PathBuf>,

    /// The user request the plan answers. Read from stdin when absent.
    #[arg(long, value_name = "TEXT")]
    pub request: Option<String>,

    /// General context file. Overrides `[context].general_context`.
    #[arg(long, value_name = "PATH")]
    pub context: Option<PathBuf>,

    /// Example SQL file. Overrides `[context].examples`.
    #[arg(long, value_name = "PATH")]
    pub examples: Option<PathBuf>,

    /// Cap on total node attempts. Overrides `[run].max_attempts`.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Directory for debugging snapshots. Overrides `[run].snapshot_dir`.
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SQLDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the plan, print it, but don't execute any node.
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
