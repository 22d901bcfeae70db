//! Reminder delivery.
//!
//! The scheduler hands every fired [`Reminder`] to a [`ReminderSink`]. Sinks:
//! - [`LogSink`]: structured log line
//! - [`ChannelSink`]: forwards to a tokio channel (the shell prints from it)
//! - [`DesktopSink`]: desktop notification via notify-rust
//! - [`FanoutSink`]: several of the above

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use notify_rust::Notification;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use meetkeep_core::{CLOCK_FORMAT, Meeting, MeetingId};

use crate::config::NotifyConfig;

/// A reminder for one meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    /// Meeting the reminder belongs to.
    pub meeting_id: MeetingId,
    /// Meeting title.
    pub title: String,
    /// Meeting start.
    pub start: NaiveDateTime,
    /// The reminder time that triggered it.
    pub notification_time: Option<NaiveDateTime>,
}

impl Reminder {
    /// Builds the reminder for a meeting.
    pub fn for_meeting(meeting: &Meeting) -> Self {
        Self {
            meeting_id: meeting.id,
            title: meeting.title.clone(),
            start: meeting.start,
            notification_time: meeting.notification_time,
        }
    }

    /// Human-readable reminder text.
    pub fn message(&self) -> String {
        format!(
            "Reminder: meeting '{}' starts at {}",
            self.title,
            self.start.format(CLOCK_FORMAT)
        )
    }
}

/// Destination for fired reminders.
pub trait ReminderSink: Send + Sync {
    /// Delivers one reminder. Errors are logged by the caller and never retried.
    fn deliver(&self, reminder: &Reminder) -> Result<(), String>;
}

/// Shared sink handle.
pub type SharedSink = Arc<dyn ReminderSink>;

/// Writes reminders to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ReminderSink for LogSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        info!(
            id = reminder.meeting_id,
            title = %reminder.title,
            start = %reminder.start,
            "{}",
            reminder.message()
        );
        Ok(())
    }
}

/// Forwards reminders to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Reminder>,
}

impl ChannelSink {
    /// Creates the sink and the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Reminder>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ReminderSink for ChannelSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        self.tx
            .send(reminder.clone())
            .map_err(|_| "reminder receiver dropped".to_string())
    }
}

/// Shows reminders as desktop notifications.
#[derive(Debug, Clone)]
pub struct DesktopSink {
    config: NotifyConfig,
}

impl DesktopSink {
    /// Creates a desktop sink.
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }
}

impl ReminderSink for DesktopSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        let summary = format!("Meeting reminder: {}", reminder.title);
        let body = format!("Starts at {}", reminder.start.format(CLOCK_FORMAT));

        debug!(id = reminder.meeting_id, title = %reminder.title, "Sending desktop notification");

        Notification::new()
            .appname(&self.config.app_name)
            .summary(&summary)
            .body(&body)
            .timeout(Duration::from_secs(u64::from(self.config.timeout_secs)))
            .show()
            .map(|_| ())
            .map_err(|e| format!("desktop notification failed: {}", e))
    }
}

/// Delivers to every inner sink; one failing sink does not stop the others.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<SharedSink>,
}

impl FanoutSink {
    /// Creates an empty fanout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a sink.
    pub fn with(mut self, sink: impl ReminderSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Builds the standard sink set: log, plus desktop when enabled.
    pub fn from_config(config: &NotifyConfig) -> Self {
        let fanout = Self::new().with(LogSink);
        if config.desktop_enabled {
            fanout.with(DesktopSink::new(config.clone()))
        } else {
            fanout
        }
    }

    /// Number of inner sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if there are no inner sinks.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReminderSink for FanoutSink {
    fn deliver(&self, reminder: &Reminder) -> Result<(), String> {
        let mut failures = 0;
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(reminder) {
                warn!(error = %e, id = reminder.meeting_id, "Reminder sink failed");
                failures += 1;
            }
        }
        if failures > 0 && failures == self.sinks.len() {
            Err(format!("all {} reminder sinks failed", failures))
        } else {
            Ok(())
        }
    }
}
