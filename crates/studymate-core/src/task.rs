//! Task and Subtask types.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::progress::{cascade, reconcile};
use crate::{CoreError, Status, SubtaskId, TaskId, UserId};

/// A checklist item belonging to exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subtask {
    /// Identifier, unique within the parent task.
    pub id: SubtaskId,

    /// Display text.
    pub title: String,

    /// Current status.
    pub status: Status,
}

impl Subtask {
    /// Create a new `TODO` subtask with a generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SubtaskId::generate(),
            title: title.into(),
            status: Status::Todo,
        }
    }

    /// Builder method to set a specific ID.
    pub fn with_id(mut self, id: SubtaskId) -> Self {
        self.id = id;
        self
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }
}

/// A top-level unit of work owned by one user.
///
/// `progress` and, when subtasks exist, `status` are derived. Fields are
/// private so the only way to change a task is through the methods below,
/// each of which returns a reconciled copy and leaves `self` untouched. The
/// untouched original is what an optimistic update rolls back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: String,
    status: Status,
    assignee: UserId,
    subtasks: Vec<Subtask>,
    progress: u8,
}

impl Task {
    /// Create a new task with no subtasks.
    pub fn new(title: impl Into<String>, assignee: UserId) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            status: Status::Todo,
            assignee,
            subtasks: Vec::new(),
            progress: 0,
        }
    }

    /// Assemble a task from stored parts, deriving progress and status.
    pub fn from_parts(
        id: TaskId,
        title: impl Into<String>,
        status: Status,
        assignee: UserId,
        subtasks: Vec<Subtask>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            status,
            assignee,
            subtasks,
            progress: 0,
        }
        .reconciled()
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn assignee(&self) -> &UserId {
        &self.assignee
    }

    pub fn subtasks(&self) -> &[Subtask] {
        &self.subtasks
    }

    /// Completion percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Look up a subtask by id.
    pub fn subtask(&self, id: &SubtaskId) -> Option<&Subtask> {
        self.subtasks.iter().find(|s| &s.id == id)
    }

    /// True when the task is `DONE` or every one of its subtasks is.
    pub fn is_completed(&self) -> bool {
        self.status.is_done()
            || (!self.subtasks.is_empty() && self.subtasks.iter().all(|s| s.status.is_done()))
    }

    /// True when stored progress and status match what reconciliation derives.
    pub fn is_reconciled(&self) -> bool {
        let derived = reconcile(self.status, &self.subtasks);
        derived.progress == self.progress && derived.status == self.status
    }

    /// Flip the task itself between `DONE` and `TODO`.
    ///
    /// With subtasks this is a bulk subtask change: all of them follow the
    /// new task status before progress is recomputed.
    pub fn with_task_toggled(&self) -> Self {
        self.with_task_status(self.status.toggled())
    }

    /// Set the task status directly, cascading to subtasks.
    pub fn with_task_status(&self, status: Status) -> Self {
        let mut next = self.clone();
        next.status = status;
        cascade(status, &mut next.subtasks);
        next.reconciled()
    }

    /// Flip one subtask between `DONE` and `TODO`.
    pub fn with_subtask_toggled(&self, subtask_id: &SubtaskId) -> Result<Self, CoreError> {
        let current = self
            .subtask(subtask_id)
            .ok_or_else(|| CoreError::SubtaskNotFound(subtask_id.to_string()))?;
        self.with_subtask_status(subtask_id, current.status.toggled())
    }

    /// Give one subtask an explicit status.
    ///
    /// Expired subtasks are frozen and reject any change.
    pub fn with_subtask_status(
        &self,
        subtask_id: &SubtaskId,
        status: Status,
    ) -> Result<Self, CoreError> {
        let mut next = self.clone();
        let subtask = next
            .subtasks
            .iter_mut()
            .find(|s| &s.id == subtask_id)
            .ok_or_else(|| CoreError::SubtaskNotFound(subtask_id.to_string()))?;

        if subtask.status == Status::Expired {
            return Err(CoreError::SubtaskExpired(subtask_id.to_string()));
        }
        subtask.status = status;

        Ok(next.reconciled())
    }

    /// Append a subtask at the end of the list.
    pub fn with_subtask_added(&self, subtask: Subtask) -> Result<Self, CoreError> {
        if self.subtask(&subtask.id).is_some() {
            return Err(CoreError::InvalidInput(format!(
                "duplicate subtask id '{}' in task '{}'",
                subtask.id, self.id
            )));
        }
        let mut next = self.clone();
        next.subtasks.push(subtask);
        Ok(next.reconciled())
    }

    /// Remove a subtask, keeping the order of the rest.
    pub fn with_subtask_removed(&self, subtask_id: &SubtaskId) -> Result<Self, CoreError> {
        let mut next = self.clone();
        let before = next.subtasks.len();
        next.subtasks.retain(|s| &s.id != subtask_id);
        if next.subtasks.len() == before {
            return Err(CoreError::SubtaskNotFound(subtask_id.to_string()));
        }
        Ok(next.reconciled())
    }

    fn reconciled(mut self) -> Self {
        let derived = reconcile(self.status, &self.subtasks);
        self.progress = derived.progress;
        self.status = derived.status;
        self
    }
}

/// Filter applied to a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks that are completed.
    Completed,
    /// Tasks that are not completed.
    Active,
    /// Tasks with exactly this status.
    Status(Status),
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.is_completed(),
            Self::Active => !task.is_completed(),
            Self::Status(status) => task.status() == *status,
        }
    }

    /// Keep the tasks that pass this filter, preserving order.
    pub fn apply<'a, I>(&self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Completed => f.write_str("completed"),
            Self::Active => f.write_str("active"),
            Self::Status(status) => write!(f, "{}", status.as_str().to_lowercase()),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "active" => Ok(Self::Active),
            other => other
                .to_ascii_uppercase()
                .parse::<Status>()
                .map(Self::Status)
                .map_err(|_| CoreError::InvalidInput(format!("unknown task filter '{}'", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with(statuses: &[Status]) -> Task {
        let subtasks = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Subtask::new(format!("step {}", i))
                    .with_id(SubtaskId::new(format!("s{}", i)))
                    .with_status(*s)
            })
            .collect();
        Task::from_parts(
            TaskId::new("t1"),
            "Read chapter 4",
            Status::Todo,
            UserId::new("u1"),
            subtasks,
        )
    }

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Essay", UserId::new("u1"));
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.progress(), 0);
        assert!(task.subtasks().is_empty());
        assert!(task.is_reconciled());
    }

    #[test]
    fn test_from_parts_derives_progress() {
        let task = task_with(&[Status::Done, Status::Done, Status::Todo]);
        assert_eq!(task.progress(), 67);
        assert_eq!(task.status(), Status::Todo);

        let lone = Task::from_parts(
            TaskId::new("t2"),
            "Lone",
            Status::Done,
            UserId::new("u1"),
            Vec::new(),
        );
        assert_eq!(lone.progress(), 100);
    }

    #[test]
    fn test_toggle_task_done_cascades() {
        let task = task_with(&[Status::Todo, Status::Doing]);
        let toggled = task.with_task_toggled();

        assert!(toggled.subtasks().iter().all(|s| s.status == Status::Done));
        assert_eq!(toggled.progress(), 100);
        assert_eq!(toggled.status(), Status::Done);
        // Original untouched.
        assert_eq!(task.subtasks()[1].status, Status::Doing);
    }

    #[test]
    fn test_toggle_task_back_resets_subtasks() {
        let task = task_with(&[Status::Done, Status::Done]);
        assert_eq!(task.status(), Status::Done);

        let toggled = task.with_task_toggled();
        assert!(toggled.subtasks().iter().all(|s| s.status == Status::Todo));
        assert_eq!(toggled.progress(), 0);
        assert_eq!(toggled.status(), Status::Todo);
    }

    #[test]
    fn test_toggle_task_without_subtasks() {
        let task = Task::new("Solo", UserId::new("u1"));
        let done = task.with_task_toggled();
        assert_eq!(done.status(), Status::Done);
        assert_eq!(done.progress(), 100);

        let undone = done.with_task_toggled();
        assert_eq!(undone.status(), Status::Todo);
        assert_eq!(undone.progress(), 0);
    }

    #[test]
    fn test_toggle_subtask_completes_task() {
        let task = task_with(&[Status::Done, Status::Todo]);
        let next = task.with_subtask_toggled(&SubtaskId::new("s1")).unwrap();
        assert_eq!(next.progress(), 100);
        assert_eq!(next.status(), Status::Done);

        let back = next.with_subtask_toggled(&SubtaskId::new("s0")).unwrap();
        assert_eq!(back.progress(), 50);
        assert_eq!(back.status(), Status::Todo);
    }

    #[test]
    fn test_expired_subtask_is_frozen() {
        let task = task_with(&[Status::Expired, Status::Todo]);
        let err = task.with_subtask_toggled(&SubtaskId::new("s0")).unwrap_err();
        assert_eq!(err, CoreError::SubtaskExpired("s0".to_string()));

        let err = task
            .with_subtask_status(&SubtaskId::new("s0"), Status::Done)
            .unwrap_err();
        assert!(matches!(err, CoreError::SubtaskExpired(_)));
    }

    #[test]
    fn test_unknown_subtask() {
        let task = task_with(&[Status::Todo]);
        let missing = SubtaskId::new("nope");
        assert!(matches!(
            task.with_subtask_toggled(&missing),
            Err(CoreError::SubtaskNotFound(_))
        ));
        assert!(matches!(
            task.with_subtask_removed(&missing),
            Err(CoreError::SubtaskNotFound(_))
        ));
    }

    #[test]
    fn test_add_and_remove_subtask_recompute() {
        let task = task_with(&[Status::Done]);
        assert_eq!(task.progress(), 100);

        let added = task
            .with_subtask_added(Subtask::new("new").with_id(SubtaskId::new("s9")))
            .unwrap();
        assert_eq!(added.progress(), 50);
        assert_eq!(added.status(), Status::Todo);
        assert_eq!(added.subtasks().last().unwrap().id, SubtaskId::new("s9"));

        let removed = added.with_subtask_removed(&SubtaskId::new("s9")).unwrap();
        assert_eq!(removed.progress(), 100);
        assert_eq!(removed.status(), Status::Done);
    }

    #[test]
    fn test_duplicate_subtask_rejected() {
        let task = task_with(&[Status::Todo]);
        let dup = Subtask::new("dup").with_id(SubtaskId::new("s0"));
        assert!(matches!(
            task.with_subtask_added(dup),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_every_mutation_stays_reconciled() {
        let task = task_with(&[Status::Todo, Status::Doing, Status::Done]);
        let steps = [
            task.with_task_toggled(),
            task.with_subtask_toggled(&SubtaskId::new("s0")).unwrap(),
            task.with_subtask_status(&SubtaskId::new("s1"), Status::Done)
                .unwrap(),
            task.with_subtask_removed(&SubtaskId::new("s2")).unwrap(),
            task.with_subtask_added(Subtask::new("x")).unwrap(),
        ];
        for step in &steps {
            assert!(step.is_reconciled(), "desync after mutation: {:?}", step);
        }
    }

    #[test]
    fn test_filters() {
        let done = task_with(&[Status::Done]);
        let open = task_with(&[Status::Todo]).with_id(TaskId::new("t2"));
        let tasks = vec![done.clone(), open.clone()];

        assert_eq!(TaskFilter::All.apply(&tasks).len(), 2);
        assert_eq!(TaskFilter::Completed.apply(&tasks), vec![done.clone()]);
        assert_eq!(TaskFilter::Active.apply(&tasks), vec![open.clone()]);
        assert_eq!(TaskFilter::Status(Status::Done).apply(&tasks), vec![done]);
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("active".parse::<TaskFilter>().unwrap(), TaskFilter::Active);
        assert_eq!(
            "doing".parse::<TaskFilter>().unwrap(),
            TaskFilter::Status(Status::Doing)
        );
        assert!("someday".parse::<TaskFilter>().is_err());
    }
}
