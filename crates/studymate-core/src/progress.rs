//! Progress reconciliation.
//!
//! A task's `progress` and aggregate `status` are derived from its subtasks.
//! Every mutation of a task goes through [`reconcile`] before the result is
//! shown or sent to the backend, so the stored values never drift from what
//! the subtasks say.

use crate::{Status, Subtask};

/// Derived state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Completion percentage in `0..=100`.
    pub progress: u8,
    /// Aggregate status.
    pub status: Status,
}

/// Derive `(progress, status)` from a task's current status and subtasks.
///
/// Without subtasks the task's own status is kept and progress is all or
/// nothing. With subtasks, progress is the rounded share of `DONE` subtasks
/// and the status collapses to `DONE` or `TODO`: a task with any unfinished
/// subtask reports `TODO`, even if some of them are `DOING`.
pub fn reconcile(status: Status, subtasks: &[Subtask]) -> Reconciliation {
    if subtasks.is_empty() {
        let progress = if status.is_done() { 100 } else { 0 };
        return Reconciliation { progress, status };
    }

    let total = subtasks.len();
    let done = subtasks.iter().filter(|s| s.status.is_done()).count();

    Reconciliation {
        progress: percent_half_up(done, total),
        status: if done == total { Status::Done } else { Status::Todo },
    }
}

/// Apply a task-level status change to every subtask.
///
/// Moving the task to `DONE` finishes every subtask; any other target resets
/// them all to `TODO`.
pub fn cascade(target: Status, subtasks: &mut [Subtask]) {
    let subtask_status = if target.is_done() {
        Status::Done
    } else {
        Status::Todo
    };
    for subtask in subtasks {
        subtask.status = subtask_status;
    }
}

/// `round(100 * done / total)` with halves rounded up, in integer arithmetic.
fn percent_half_up(done: usize, total: usize) -> u8 {
    debug_assert!(total > 0 && done <= total);
    ((200 * done + total) / (2 * total)) as u8
}
