//! JSON shapes exchanged with the backend.
//!
//! These stay separate from the domain types: a task coming off the wire has
//! its progress derived on arrival, and a status outside the closed set fails
//! deserialization instead of being coerced.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use studymate_core::schedule::NewWorksession;
use studymate_core::{
    Status, Subtask, SubtaskId, Task, TaskId, TimeRange, UserId, Worksession, WorksessionId,
};

use crate::error::ClientError;

/// Subtask as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    pub id: SubtaskId,
    pub title: String,
    pub status: Status,
}

/// Task as stored by the backend. This is also the full representation sent
/// with `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub status: Status,
    pub assignee: UserId,
    #[serde(default)]
    pub subtasks: Vec<SubtaskRecord>,
}

impl From<SubtaskRecord> for Subtask {
    fn from(record: SubtaskRecord) -> Self {
        Subtask::new(record.title)
            .with_id(record.id)
            .with_status(record.status)
    }
}

impl From<&Subtask> for SubtaskRecord {
    fn from(subtask: &Subtask) -> Self {
        Self {
            id: subtask.id.clone(),
            title: subtask.title.clone(),
            status: subtask.status,
        }
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Task::from_parts(
            record.id,
            record.title,
            record.status,
            record.assignee,
            record.subtasks.into_iter().map(Subtask::from).collect(),
        )
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().clone(),
            title: task.title().to_string(),
            status: task.status(),
            assignee: task.assignee().clone(),
            subtasks: task.subtasks().iter().map(SubtaskRecord::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest<'a> {
    pub title: &'a str,
    pub assignee: &'a UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSubtaskRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login reply. Older backends send the user id as `id`, newer ones as
/// `userId`, and either may be numeric.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl LoginResponse {
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .as_ref()
            .or(self.id.as_ref())
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(UserId::new(s.clone())),
                Value::Number(n) => Some(UserId::new(n.to_string())),
                _ => None,
            })
    }
}

/// `{ "value": ... }` wrapper the worksession endpoints use for ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wrapped<T> {
    pub value: T,
}

impl<T> Wrapped<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeRecord {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksessionRecord {
    pub id: Wrapped<WorksessionId>,
    pub title: String,
    pub time_range: TimeRangeRecord,
    pub subject_id: Wrapped<TaskId>,
    pub collaborator_id: Wrapped<UserId>,
}

impl TryFrom<WorksessionRecord> for Worksession {
    type Error = ClientError;

    fn try_from(record: WorksessionRecord) -> Result<Self, Self::Error> {
        let time_range =
            TimeRange::new(record.time_range.start_time, record.time_range.end_time).map_err(
                |e| ClientError::Serialization(format!("worksession {}: {}", record.id.value, e)),
            )?;
        Ok(Worksession {
            id: record.id.value,
            title: record.title,
            time_range,
            subject_id: record.subject_id.value,
            collaborator_id: record.collaborator_id.value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorksessionRequest {
    pub title: String,
    pub time_range: TimeRangeRecord,
    pub subject_id: Wrapped<TaskId>,
    pub collaborator_id: Wrapped<UserId>,
}

impl From<&NewWorksession> for CreateWorksessionRequest {
    fn from(session: &NewWorksession) -> Self {
        Self {
            title: session.title.clone(),
            time_range: TimeRangeRecord {
                start_time: session.time_range.start(),
                end_time: session.time_range.end(),
            },
            subject_id: Wrapped::new(session.subject_id.clone()),
            collaborator_id: Wrapped::new(session.collaborator_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_record_derives_progress() {
        let record: TaskRecord = serde_json::from_value(json!({
            "id": "t1",
            "title": "Statistics",
            "status": "DOING",
            "assignee": "u1",
            "progress": 5,
            "subtasks": [
                {"id": "s1", "title": "a", "status": "DONE"},
                {"id": "s2", "title": "b", "status": "DOING"}
            ]
        }))
        .unwrap();

        let task = Task::from(record);
        assert_eq!(task.progress(), 50);
        assert_eq!(task.status(), Status::Todo);
        assert!(task.is_reconciled());
    }

    #[test]
    fn test_missing_subtasks_default_empty() {
        let record: TaskRecord = serde_json::from_value(json!({
            "id": "t1", "title": "x", "status": "DONE", "assignee": "u1"
        }))
        .unwrap();
        assert_eq!(Task::from(record).progress(), 100);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_value::<TaskRecord>(json!({
            "id": "t1", "title": "x", "status": "BLOCKED", "assignee": "u1"
        }));
        assert!(result.is_err());

        let result = serde_json::from_value::<TaskRecord>(json!({
            "id": "t1", "title": "x", "status": "TODO", "assignee": "u1",
            "subtasks": [{"id": "s1", "title": "a", "status": "done"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_put_body_shape() {
        let task = Task::from_parts(
            TaskId::new("t1"),
            "Essay",
            Status::Todo,
            UserId::new("u1"),
            vec![Subtask::new("outline").with_id(SubtaskId::new("s1"))],
        )
        .with_task_toggled();

        let body = serde_json::to_value(TaskRecord::from(&task)).unwrap();
        assert_eq!(
            body,
            json!({
                "id": "t1",
                "title": "Essay",
                "status": "DONE",
                "assignee": "u1",
                "subtasks": [{"id": "s1", "title": "outline", "status": "DONE"}]
            })
        );
    }

    #[test]
    fn test_login_user_id_variants() {
        let r: LoginResponse = serde_json::from_value(json!({"token": "t", "userId": 42})).unwrap();
        assert_eq!(r.user_id(), Some(UserId::new("42")));

        let r: LoginResponse = serde_json::from_value(json!({"token": "t", "id": "abc"})).unwrap();
        assert_eq!(r.user_id(), Some(UserId::new("abc")));

        let r: LoginResponse = serde_json::from_value(json!({"token": "t"})).unwrap();
        assert_eq!(r.user_id(), None);
    }

    #[test]
    fn test_worksession_record() {
        let record: WorksessionRecord = serde_json::from_value(json!({
            "id": {"value": "w1"},
            "title": "Revise",
            "timeRange": {"startTime": "2025-03-05T14:00:00", "endTime": "2025-03-05T15:30:00"},
            "subjectId": {"value": "t1"},
            "collaboratorId": {"value": "u1"}
        }))
        .unwrap();

        let session = Worksession::try_from(record).unwrap();
        assert_eq!(session.id, WorksessionId::new("w1"));
        assert_eq!(session.time_range.duration(), chrono::Duration::minutes(90));
    }

    #[test]
    fn test_worksession_record_with_inverted_range() {
        let record: WorksessionRecord = serde_json::from_value(json!({
            "id": {"value": "w1"},
            "title": "Broken",
            "timeRange": {"startTime": "2025-03-05T14:00:00", "endTime": "2025-03-05T13:00:00"},
            "subjectId": {"value": "t1"},
            "collaboratorId": {"value": "u1"}
        }))
        .unwrap();
        assert!(matches!(
            Worksession::try_from(record),
            Err(ClientError::Serialization(_))
        ));
    }
}
