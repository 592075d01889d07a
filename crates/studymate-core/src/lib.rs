//! StudyMate Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Credential storage
//! - Runtime specifics
//!
//! The central piece is the progress reconciler in [`progress`], which keeps a
//! task's derived progress and status in line with its subtasks.

pub mod error;
pub mod ids;
pub mod peer;
pub mod progress;
pub mod schedule;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use error::{CoreError, ScheduleError};
pub use ids::{GroupId, SubtaskId, TaskId, UserId, WorksessionId};
pub use peer::{peers, Group, Peer, PeerFilter, PeerKind, Profile, User};
pub use progress::{reconcile, Reconciliation};
pub use schedule::{
    week_schedule, week_start, DaySchedule, NewWorksession, TimeRange, Worksession,
    WorksessionDraft,
};
pub use status::Status;
pub use task::{Subtask, Task, TaskFilter};
