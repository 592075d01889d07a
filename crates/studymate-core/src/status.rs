//! Status shared by tasks and subtasks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Status of a Task or Subtask.
///
/// The set is closed: anything else arriving from the backend is rejected
/// rather than coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not started.
    #[default]
    Todo,
    /// In progress.
    Doing,
    /// Finished.
    Done,
    /// Deadline passed before completion.
    Expired,
}

impl Status {
    /// All statuses, in display order.
    pub const ALL: [Status; 4] = [Status::Todo, Status::Doing, Status::Done, Status::Expired];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Doing => "DOING",
            Self::Done => "DONE",
            Self::Expired => "EXPIRED",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The status a checkbox toggle moves to: `DONE` goes back to `TODO`,
    /// everything else becomes `DONE`.
    pub fn toggled(&self) -> Self {
        if self.is_done() {
            Self::Todo
        } else {
            Self::Done
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(Self::Todo),
            "DOING" => Ok(Self::Doing),
            "DONE" => Ok(Self::Done),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}
