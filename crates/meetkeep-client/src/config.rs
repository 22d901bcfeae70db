//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/meetkeep/config.toml` by default. A missing file means
//! defaults; every section and key is optional.
//!
//! ```toml
//! debug = false
//!
//! [scheduler]
//! tick_secs = 30
//!
//! [notifications]
//! desktop = true
//! app_name = "meetkeep"
//! timeout_secs = 10
//!
//! [display]
//! json = false
//!
//! [logging]
//! format = "compact"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use meetkeep_core::{TracingConfig, TracingOutputFormat};
use meetkeep_service::{DEFAULT_TICK_INTERVAL, NotifyConfig, SchedulerConfig};

use crate::cli::Cli;
use crate::error::{ClientError, ClientResult};

/// Configuration for the meetkeep client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Reminder scheduler settings.
    pub scheduler: SchedulerSettings,

    /// Reminder delivery settings.
    pub notifications: NotificationSettings,

    /// Output settings.
    pub display: DisplaySettings,

    /// Log settings.
    pub logging: LoggingSettings,
}

/// Reminder scheduler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Seconds between reminder checks.
    pub tick_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_INTERVAL.as_secs(),
        }
    }
}

/// Reminder delivery settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Show reminders as desktop notifications too.
    pub desktop: bool,

    /// Application name for desktop notifications.
    pub app_name: String,

    /// Desktop notification timeout in seconds.
    pub timeout_secs: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        let defaults = NotifyConfig::default();
        Self {
            desktop: defaults.desktop_enabled,
            app_name: defaults.app_name,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Print listings as JSON.
    pub json: bool,
}

/// Log settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log line format on stderr.
    pub format: TracingOutputFormat,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses TOML configuration.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetkeep")
            .join("config.toml")
    }

    /// Applies command-line overrides.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        self.debug |= cli.debug;
        self.display.json |= cli.json;
        self.notifications.desktop |= cli.desktop;
        if let Some(secs) = cli.tick_secs {
            self.scheduler.tick_secs = secs;
        }
        if let Some(format) = cli.log_format {
            self.logging.format = format;
        }
        self
    }

    /// Tracing setup: quiet for the shell, verbose in debug mode.
    pub fn tracing_config(&self) -> TracingConfig {
        let preset = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::shell()
        };
        preset.with_format(self.logging.format)
    }

    /// Scheduler configuration for the service.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(Duration::from_secs(self.scheduler.tick_secs))
    }

    /// Desktop notification configuration for the service.
    pub fn notify_config(&self) -> NotifyConfig {
        NotifyConfig::default()
            .with_desktop(self.notifications.desktop)
            .with_app_name(self.notifications.app_name.clone())
            .with_timeout(self.notifications.timeout_secs)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
    }
}
