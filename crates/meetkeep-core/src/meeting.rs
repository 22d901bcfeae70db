//! Meeting types.
//!
//! - [`MeetingDraft`]: caller input for a new meeting (no id yet)
//! - [`Meeting`]: a stored meeting with its id and reminder state

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store. Starts at 1 and is never reused.
pub type MeetingId = u64;

/// Format used for times in listings, exports and reminders.
pub const CLOCK_FORMAT: &str = "%H:%M";

/// A meeting that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingDraft {
    /// Meeting title.
    pub title: String,
    /// Start of the meeting (local clock).
    pub start: NaiveDateTime,
    /// End of the meeting (local clock).
    pub end: NaiveDateTime,
    /// When to surface a reminder, if at all.
    pub notification_time: Option<NaiveDateTime>,
}

impl MeetingDraft {
    /// Creates a draft without a reminder.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            notification_time: None,
        }
    }

    /// Builder: set the reminder time.
    pub fn with_notification(mut self, at: NaiveDateTime) -> Self {
        self.notification_time = Some(at);
        self
    }

    /// Turns the draft into a meeting with the given id.
    pub fn into_meeting(self, id: MeetingId) -> Meeting {
        Meeting {
            id,
            title: self.title,
            start: self.start,
            end: self.end,
            notification_time: self.notification_time,
            notification_shown: false,
        }
    }
}

/// A stored meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Store-assigned identifier.
    pub id: MeetingId,
    /// Meeting title. Not required to be unique.
    pub title: String,
    /// Start of the meeting (local clock).
    pub start: NaiveDateTime,
    /// End of the meeting (local clock), strictly after `start`.
    pub end: NaiveDateTime,
    /// When to surface a reminder. At or before `start` when present.
    pub notification_time: Option<NaiveDateTime>,
    /// Whether the reminder has already been surfaced.
    #[serde(default)]
    pub notification_shown: bool,
}

impl Meeting {
    /// Half-open interval overlap of `[self.start, self.end)` and `[start, end)`.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.end && self.start < end
    }

    /// Returns true if the meeting starts on the given calendar day.
    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.date() == date
    }

    /// Returns true if the reminder should fire at `now`.
    ///
    /// That is: a reminder is set, not yet shown, and
    /// `notification_time <= now < start`.
    pub fn is_reminder_due(&self, now: NaiveDateTime) -> bool {
        match self.notification_time {
            Some(at) => !self.notification_shown && at <= now && now < self.start,
            None => false,
        }
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} - {} | {}",
            self.id,
            self.start.format(CLOCK_FORMAT),
            self.end.format(CLOCK_FORMAT),
            self.title
        )?;
        if let Some(at) = self.notification_time {
            write!(f, " (reminder at {})", at.format(CLOCK_FORMAT))?;
        }
        Ok(())
    }
}
