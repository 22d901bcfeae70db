//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use meetkeep_core::TracingOutputFormat;

/// meetkeep - keep track of today's meetings and get reminded in time
#[derive(Debug, Parser)]
#[command(name = "meetkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETKEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Print listings as JSON
    #[arg(long)]
    pub json: bool,

    /// Seconds between reminder checks (overrides the config file)
    #[arg(long)]
    pub tick_secs: Option<u64>,

    /// Also show reminders as desktop notifications
    #[arg(long)]
    pub desktop: bool,

    /// Log output format: pretty, compact or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands. Without one, the interactive shell starts.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration
    Dump,

    /// Show configuration file path
    Path,
}
