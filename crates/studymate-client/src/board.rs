//! Task board: the in-memory task list behind the task screens, and the
//! mutation entry points that keep it in step with the backend.
//!
//! Every toggle follows the same sequence:
//!
//! 1. reconcile the change synchronously (no desync is ever visible),
//! 2. replace the local copy (optimistic update),
//! 3. send the full task to the store.
//!
//! If step 3 fails the pre-mutation copy is put back and the authoritative
//! list is fetched again. The write itself is never retried. At most one
//! mutation per task id is in flight; a second one is rejected until the
//! first resolves, and a refetch never overwrites a task whose write is
//! still pending.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use studymate_core::{CoreError, Status, Subtask, SubtaskId, Task, TaskFilter, TaskId};

use crate::error::ClientError;

/// Remote source of truth for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Authoritative list of the current user's tasks.
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;

    /// Store the full task representation.
    async fn update_task(&self, task: &Task) -> Result<(), ClientError>;

    async fn create_task(&self, title: &str) -> Result<Task, ClientError>;

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError>;

    async fn create_subtask(&self, task_id: &TaskId, title: &str) -> Result<Subtask, ClientError>;

    async fn delete_subtask(
        &self,
        task_id: &TaskId,
        subtask_id: &SubtaskId,
    ) -> Result<(), ClientError>;
}

#[derive(Default)]
struct BoardState {
    tasks: Vec<Task>,
    in_flight: HashSet<TaskId>,
    closed: bool,
}

impl BoardState {
    fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Swap in a new version of a task. Returns false if it is gone.
    fn replace(&mut self, task: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id() == task.id()) {
            Some(slot) => {
                *slot = task;
                true
            }
            None => false,
        }
    }
}

/// Marks a task id as busy until dropped.
struct InFlight<'a> {
    state: &'a Mutex<BoardState>,
    id: TaskId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).in_flight.remove(&self.id);
    }
}

fn lock(state: &Mutex<BoardState>) -> MutexGuard<'_, BoardState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory task list with optimistic, reconciled mutations.
pub struct TaskBoard<S> {
    store: S,
    state: Mutex<BoardState>,
}

impl<S: TaskStore> TaskBoard<S> {
    /// Create an empty board. Call [`refresh`](Self::refresh) to load it.
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: Mutex::new(BoardState::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the current list.
    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.state).tasks.clone()
    }

    /// Snapshot of the tasks passing `filter`.
    pub fn filtered(&self, filter: TaskFilter) -> Vec<Task> {
        filter.apply(&lock(&self.state).tasks)
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        lock(&self.state).find(id).cloned()
    }

    pub fn is_in_flight(&self, id: &TaskId) -> bool {
        lock(&self.state).in_flight.contains(id)
    }

    /// Tear the board down. Writes still pending complete against the store
    /// but their results are ignored.
    pub fn close(&self) {
        let mut state = lock(&self.state);
        state.closed = true;
        state.tasks.clear();
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }

    /// Replace local state with the store's list.
    ///
    /// Tasks with a mutation in flight keep their local copy; the pending
    /// write settles them.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let tasks = self.store.list_tasks().await?;
        let mut state = lock(&self.state);
        if state.closed {
            debug!("Board closed, dropping refreshed task list");
            return Ok(());
        }

        let tasks: Vec<Task> = tasks
            .into_iter()
            .map(|task| {
                if state.in_flight.contains(task.id()) {
                    if let Some(local) = state.find(task.id()) {
                        return local.clone();
                    }
                }
                task
            })
            .collect();
        debug!(
            count = tasks.len(),
            pending = state.in_flight.len(),
            "Task board refreshed"
        );
        state.tasks = tasks;
        Ok(())
    }

    /// Refetch after a write left the board out of step with the store.
    /// The refetch error is logged; the caller reports the original one.
    async fn resync(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Refetch after failed update also failed");
        }
    }

    /// Flip a task between `DONE` and `TODO`, cascading to its subtasks.
    pub async fn toggle_task(&self, id: &TaskId) -> Result<Task, ClientError> {
        self.mutate(id, |task| Ok(task.with_task_toggled())).await
    }

    /// Flip one subtask between `DONE` and `TODO`.
    pub async fn toggle_subtask(
        &self,
        id: &TaskId,
        subtask_id: &SubtaskId,
    ) -> Result<Task, ClientError> {
        self.mutate(id, |task| task.with_subtask_toggled(subtask_id))
            .await
    }

    /// Give one subtask an explicit status.
    pub async fn set_subtask_status(
        &self,
        id: &TaskId,
        subtask_id: &SubtaskId,
        status: Status,
    ) -> Result<Task, ClientError> {
        self.mutate(id, |task| task.with_subtask_status(subtask_id, status))
            .await
    }

    /// Create a subtask remotely, then append it locally.
    pub async fn add_subtask(&self, id: &TaskId, title: &str) -> Result<Subtask, ClientError> {
        let guard = self.begin(id)?;
        let subtask = self.store.create_subtask(id, title).await?;

        let applied = {
            let mut state = lock(&self.state);
            let added = state
                .find(id)
                .map(|task| task.with_subtask_added(subtask.clone()));
            match added {
                Some(Ok(updated)) => {
                    state.replace(updated);
                    Ok(())
                }
                Some(Err(err)) => Err(err),
                None => Ok(()),
            }
        };

        if let Err(err) = applied {
            warn!(task_id = %id, error = %err, "Created subtask does not fit local copy, refetching");
            drop(guard);
            self.resync().await;
            return Err(err.into());
        }
        Ok(subtask)
    }

    /// Delete a subtask remotely, then drop it locally.
    pub async fn remove_subtask(
        &self,
        id: &TaskId,
        subtask_id: &SubtaskId,
    ) -> Result<(), ClientError> {
        let _guard = self.begin(id)?;
        self.store.delete_subtask(id, subtask_id).await?;

        let mut state = lock(&self.state);
        if let Some(task) = state.find(id) {
            // Already gone locally is fine; the store is the authority.
            if task.subtask(subtask_id).is_some() {
                let updated = task.with_subtask_removed(subtask_id)?;
                state.replace(updated);
            }
        }
        Ok(())
    }

    /// Create a task remotely and append it to the list.
    pub async fn create_task(&self, title: &str) -> Result<Task, ClientError> {
        let task = self.store.create_task(title).await?;
        let mut state = lock(&self.state);
        if !state.closed {
            state.tasks.push(task.clone());
        }
        Ok(task)
    }

    /// Delete a task remotely, then remove it from the list.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        let _guard = self.begin(id)?;
        self.store.delete_task(id).await?;
        lock(&self.state).tasks.retain(|t| t.id() != id);
        info!(task_id = %id, "Task removed from board");
        Ok(())
    }

    /// Claim the in-flight slot for `id`.
    fn begin(&self, id: &TaskId) -> Result<InFlight<'_>, ClientError> {
        let mut state = lock(&self.state);
        if state.find(id).is_none() {
            return Err(ClientError::NotFound(format!("task {}", id)));
        }
        if !state.in_flight.insert(id.clone()) {
            return Err(ClientError::MutationInFlight(id.clone()));
        }
        Ok(InFlight {
            state: &self.state,
            id: id.clone(),
        })
    }

    async fn mutate<F>(&self, id: &TaskId, change: F) -> Result<Task, ClientError>
    where
        F: FnOnce(&Task) -> Result<Task, CoreError>,
    {
        let guard = self.begin(id)?;

        let (original, updated) = {
            let mut state = lock(&self.state);
            let current = state
                .find(id)
                .ok_or_else(|| ClientError::NotFound(format!("task {}", id)))?;
            let updated = change(current)?;
            let original = current.clone();
            state.replace(updated.clone());
            (original, updated)
        };
        debug!(
            task_id = %id,
            progress = updated.progress(),
            status = %updated.status(),
            "Applied optimistic update"
        );

        let result = self.store.update_task(&updated).await;

        {
            let mut state = lock(&self.state);
            if state.closed {
                debug!(task_id = %id, "Board closed, ignoring late write result");
                return result.map(|_| updated);
            }
            if result.is_err() {
                state.replace(original);
            }
        }

        match result {
            Ok(()) => Ok(updated),
            Err(err) => {
                warn!(task_id = %id, error = %err, "Task update failed, refetching");
                drop(guard);
                self.resync().await;
                Err(err)
            }
        }
    }
}
