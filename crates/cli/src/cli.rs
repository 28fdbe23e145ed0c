//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Severity;
use std::path::PathBuf;

/// logrouter - host for the in-process log router
#[derive(Parser, Debug)]
#[command(
    name = "logrouter",
    author,
    version,
    about = "In-process log router host",
    long_about = "Loads a router configuration, registers its targets, and drives the router \n\
                  from a host update loop: producers submit records, and each tick drains \n\
                  one bounded batch of deferred dispatches."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGROUTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGROUTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a host loop against the router
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults are used if omitted
    #[arg(short, long, env = "LOGROUTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Force deferred dispatch on
    #[arg(long)]
    pub deferred: bool,

    /// Override the severity filter
    #[arg(long, env = "LOGROUTER_SEVERITY_FILTER")]
    pub severity_filter: Option<Severity>,

    /// Number of concurrent producers
    #[arg(long, default_value = "4")]
    pub producers: usize,

    /// Records submitted by each producer
    #[arg(long, default_value = "100")]
    pub messages: u64,

    /// Host update tick in milliseconds
    #[arg(long, default_value = "16", env = "LOGROUTER_TICK_MS")]
    pub tick_ms: u64,

    /// Stop after this many ticks (0 = run until everything is delivered)
    #[arg(long, default_value = "0")]
    pub max_ticks: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGROUTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "router.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "router.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
