//! Error types for the StudyMate client.

use thiserror::Error;

use studymate_core::{CoreError, ScheduleError, TaskId};

/// Errors that can occur when talking to the StudyMate backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to build the HTTP client or reach the server.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// No session token available; the user has to log in first.
    #[error("no token found, log in first")]
    NotAuthenticated,

    /// Login succeeded on the wire but the response was unusable.
    #[error("login failed: {0}")]
    Login(String),

    /// Serialization/deserialization error, including unknown status values.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading or writing stored credentials failed.
    #[error("credential store error: {0}")]
    Credentials(String),

    /// Another mutation on the same task has not resolved yet.
    #[error("a change to task {0} is still in flight")]
    MutationInFlight(TaskId),

    /// Domain rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Worksession validation failure.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
