// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `ambari-playbook`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ambari-playbook",
    version,
    about = "Run a YAML playbook of tasks against an Ambari-managed cluster.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the playbook file (YAML).
    #[arg(long, short = 'p', value_name = "PATH")]
    pub playbook: String,

    /// Input overrides, e.g. `--vars "VERSION=3.1 NODE=nn1"`.
    #[arg(long, value_name = "PAIRS")]
    pub vars: Option<String>,

    /// Path to the registry file (TOML).
    ///
    /// Default: `ambari-registry.toml` in the current working directory.
    #[arg(long, value_name = "PATH", env = "AMBARI_PLAYBOOK_REGISTRY")]
    pub registry: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `AMBARI_PLAYBOOK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate the playbook, print its tasks, execute nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Override `[engine].max_parallel_hosts` from the registry file.
    #[arg(long, value_name = "N")]
    pub max_parallel_hosts: Option<usize>,
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
