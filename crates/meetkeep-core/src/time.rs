//! Local clock and timestamp parsing.
//!
//! All meeting times are naive local timestamps read from a single [`Clock`].
//! [`SystemClock`] follows the wall clock; [`ManualClock`] is moved by hand.

use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Input format for timestamps, e.g. `20.10.2026 14:30`.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Input format for calendar days, e.g. `20.10.2026`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Returns the current local time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the clock forward (or backward for negative durations).
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Error returned when user input is not a valid timestamp or date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{input}', expected {expected}")]
pub struct TimeParseError {
    kind: &'static str,
    input: String,
    expected: &'static str,
}

impl TimeParseError {
    fn timestamp(input: &str) -> Self {
        Self {
            kind: "timestamp",
            input: input.to_string(),
            expected: "dd.mm.yyyy HH:MM",
        }
    }

    fn date(input: &str) -> Self {
        Self {
            kind: "date",
            input: input.to_string(),
            expected: "dd.mm.yyyy",
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Parses `dd.mm.yyyy HH:MM`.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimeParseError> {
    let trimmed = input.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .map_err(|_| TimeParseError::timestamp(trimmed))
}

/// Parses `dd.mm.yyyy`.
pub fn parse_date(input: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| TimeParseError::date(trimmed))
}

/// Parses an optional timestamp; blank input means "not set".
pub fn parse_optional_timestamp(input: &str) -> Result<Option<NaiveDateTime>, TimeParseError> {
    if input.trim().is_empty() {
        Ok(None)
    } else {
        parse_timestamp(input).map(Some)
    }
}
