//! Service configuration.

use std::time::Duration;

/// Default period between reminder scans.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Reminder scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between two ticks. The first tick runs immediately on start.
    pub tick_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl SchedulerConfig {
    /// Creates a config with the given tick interval.
    pub fn new(tick_interval: Duration) -> Self {
        Self::default().with_tick_interval(tick_interval)
    }

    /// Builder: set tick interval. Zero is bumped to one second.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        self
    }
}

/// Desktop notification configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Whether reminders are also shown as desktop notifications.
    pub desktop_enabled: bool,
    /// Application name reported to the notification daemon.
    pub app_name: String,
    /// How long a desktop notification stays visible.
    pub timeout_secs: u32,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            desktop_enabled: false,
            app_name: "meetkeep".to_string(),
            timeout_secs: 10,
        }
    }
}

impl NotifyConfig {
    /// Builder: enable or disable desktop notifications.
    pub fn with_desktop(mut self, enabled: bool) -> Self {
        self.desktop_enabled = enabled;
        self
    }

    /// Builder: set app name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Builder: set timeout.
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }
}
