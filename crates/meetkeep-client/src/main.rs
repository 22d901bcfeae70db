//! meetkeep CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use meetkeep_client::cli::{Cli, Command, ConfigAction};
use meetkeep_client::commands;
use meetkeep_client::config::ClientConfig;
use meetkeep_client::error::ClientResult;
use meetkeep_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // An explicit path must exist; the default one is optional.
    let source = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    }
    .merge_cli(&cli);

    init_tracing(config.tracing_config())?;
    debug!(config = %source.display(), "Configuration loaded");

    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &source),
            ConfigAction::Path => commands::config::path(&source),
        },
        None => commands::shell::run(&config).await,
    }
}
