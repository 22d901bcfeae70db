//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Renders the effective configuration with a header naming its source.
pub fn render(config: &ClientConfig, source: &Path) -> ClientResult<String> {
    Ok(format!(
        "# config.toml ({})\n{}",
        source.display(),
        config.to_toml()?
    ))
}

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig, source: &Path) -> ClientResult<()> {
    println!("{}", render(config, source)?);
    Ok(())
}

/// Show the configuration file path.
pub fn path(source: &Path) -> ClientResult<()> {
    let exists = if source.exists() { "" } else { " (not found)" };
    println!("config: {}{}", source.display(), exists);
    Ok(())
}
