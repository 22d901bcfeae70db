//! CLI, configuration file and interactive shell
//!
//! This crate provides the `meetkeep` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod shell;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use shell::{MenuAction, Shell};
