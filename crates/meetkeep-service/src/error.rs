//! Service error types.

use std::io;

use meetkeep_core::MeetingId;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the store and the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// An argument was rejected before touching the store.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// No meeting with this id is stored.
    #[error("meeting {id} not found")]
    NotFound { id: MeetingId },

    /// A business rule was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// IO error while exporting.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(id: MeetingId) -> Self {
        Self::NotFound { id }
    }

    /// Returns true for [`ServiceError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the violated rule, if this is a validation error.
    pub fn validation_reason(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Business rule violations, one variant per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The meeting does not start after the current time.
    #[error("must be scheduled in the future")]
    PastStart,

    /// The meeting does not end after it starts.
    #[error("invalid end time")]
    InvalidEndTime,

    /// The reminder is set after the meeting starts.
    #[error("reminder must precede start")]
    LateReminder,

    /// The meeting overlaps another stored meeting.
    #[error("overlapping meeting")]
    TimeConflict { conflicting_id: MeetingId },

    /// Updates are refused once a meeting has started.
    #[error("meeting has already started or finished")]
    AlreadyStarted,
}
