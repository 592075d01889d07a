//! Task endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use studymate_core::{CoreError, Subtask, SubtaskId, Task, TaskFilter, TaskId, UserId};

use crate::board::TaskStore;
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::wire::{CreateSubtaskRequest, CreateTaskRequest, SubtaskRecord, TaskRecord};

/// Client for `/tasks`.
#[derive(Clone)]
pub struct TaskService {
    http: Arc<HttpClient>,
}

impl TaskService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn current_user(&self) -> Result<UserId, ClientError> {
        self.http
            .session()?
            .user_id
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Tasks assigned to the logged-in user.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let user = self.current_user()?;
        let records: Vec<TaskRecord> = self.http.get_json("/tasks").await?;
        let total = records.len();

        let tasks: Vec<Task> = records
            .into_iter()
            .filter(|r| r.assignee == user)
            .map(Task::from)
            .collect();

        debug!(user = %user, total, mine = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// Tasks assigned to the logged-in user that pass `filter`.
    pub async fn list_filtered(&self, filter: TaskFilter) -> Result<Vec<Task>, ClientError> {
        let tasks = self.list_tasks().await?;
        Ok(filter.apply(&tasks))
    }

    /// Look up one of the user's tasks.
    pub async fn get_task(&self, id: &TaskId) -> Result<Task, ClientError> {
        self.list_tasks()
            .await?
            .into_iter()
            .find(|t| t.id() == id)
            .ok_or_else(|| ClientError::NotFound(format!("task {}", id)))
    }

    /// Create a task assigned to the logged-in user.
    pub async fn create_task(&self, title: &str) -> Result<Task, ClientError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput(
                "task title must not be empty".to_string(),
            )
            .into());
        }
        let assignee = self.current_user()?;
        let request = CreateTaskRequest {
            title,
            assignee: &assignee,
        };

        let record: TaskRecord = self.http.post_json("/tasks", &request).await?;
        info!(task_id = %record.id, "Task created");
        Ok(Task::from(record))
    }

    /// Replace the stored task with this full representation.
    pub async fn update_task(&self, task: &Task) -> Result<(), ClientError> {
        let path = format!("/tasks/{}", task.id());
        self.http.put_json(&path, &TaskRecord::from(task)).await?;
        debug!(task_id = %task.id(), progress = task.progress(), status = %task.status(), "Task updated");
        Ok(())
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        self.http.delete(&format!("/tasks/{}", id)).await?;
        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    pub async fn create_subtask(&self, task_id: &TaskId, title: &str) -> Result<Subtask, ClientError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::InvalidInput(
                "subtask title must not be empty".to_string(),
            )
            .into());
        }
        let path = format!("/tasks/{}/subtasks", task_id);
        let record: SubtaskRecord = self
            .http
            .post_json(&path, &CreateSubtaskRequest { title })
            .await?;
        debug!(task_id = %task_id, subtask_id = %record.id, "Subtask created");
        Ok(Subtask::from(record))
    }

    pub async fn delete_subtask(
        &self,
        task_id: &TaskId,
        subtask_id: &SubtaskId,
    ) -> Result<(), ClientError> {
        let path = format!("/tasks/{}/subtasks/{}", task_id, subtask_id);
        self.http.delete(&path).await?;
        debug!(task_id = %task_id, subtask_id = %subtask_id, "Subtask deleted");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for TaskService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        TaskService::list_tasks(self).await
    }

    async fn update_task(&self, task: &Task) -> Result<(), ClientError> {
        TaskService::update_task(self, task).await
    }

    async fn create_task(&self, title: &str) -> Result<Task, ClientError> {
        TaskService::create_task(self, title).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        TaskService::delete_task(self, id).await
    }

    async fn create_subtask(&self, task_id: &TaskId, title: &str) -> Result<Subtask, ClientError> {
        TaskService::create_subtask(self, task_id, title).await
    }

    async fn delete_subtask(
        &self,
        task_id: &TaskId,
        subtask_id: &SubtaskId,
    ) -> Result<(), ClientError> {
        TaskService::delete_subtask(self, task_id, subtask_id).await
    }
}
