//! Core types: meetings, clock, timestamp parsing, tracing

pub mod meeting;
pub mod time;
pub mod tracing;

pub use meeting::{CLOCK_FORMAT, Meeting, MeetingDraft, MeetingId};
pub use time::{
    Clock, DATE_FORMAT, ManualClock, SystemClock, TIMESTAMP_FORMAT, TimeParseError, parse_date,
    parse_optional_timestamp, parse_timestamp,
};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
