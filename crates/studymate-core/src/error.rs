//! Core domain errors.

use thiserror::Error;

/// Core domain errors for StudyMate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Subtask not found in its parent task.
    #[error("Subtask not found: {0}")]
    SubtaskNotFound(String),

    /// Expired subtasks cannot be toggled.
    #[error("Subtask '{0}' has expired and cannot be toggled")]
    SubtaskExpired(String),

    /// A status string outside the closed set was received.
    #[error("Invalid status: '{0}' (expected TODO, DOING, DONE or EXPIRED)")]
    InvalidStatus(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Validation failures when scheduling a worksession.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("Please enter a title")]
    MissingTitle,

    #[error("Please select a task")]
    MissingSubject,

    #[error("Cannot create worksession in the past")]
    StartsInPast,

    #[error("Please enter a valid duration")]
    InvalidDuration,

    #[error("Duration cannot exceed {max} hours (got {hours})")]
    TooLong { hours: f64, max: f64 },

    #[error("Duration must be at least {min} hours (got {hours})")]
    TooShort { hours: f64, min: f64 },

    #[error("User not authenticated")]
    MissingCollaborator,

    /// End of a time range does not come after its start.
    #[error("Time range ends before it starts")]
    EmptyRange,
}
