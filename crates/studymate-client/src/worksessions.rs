//! Worksession endpoints.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use studymate_core::{
    week_schedule, DaySchedule, Worksession, WorksessionDraft, WorksessionId,
};

use crate::error::ClientError;
use crate::http::HttpClient;
use crate::wire::{CreateWorksessionRequest, WorksessionRecord};

/// Client for `/worksessions`.
#[derive(Clone)]
pub struct WorksessionService {
    http: Arc<HttpClient>,
}

impl WorksessionService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<Worksession>, ClientError> {
        let records: Vec<WorksessionRecord> = self.http.get_json("/worksessions").await?;
        let sessions = records
            .into_iter()
            .map(Worksession::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = sessions.len(), "Fetched worksessions");
        Ok(sessions)
    }

    /// Sessions starting on `day`.
    pub async fn on_day(&self, day: NaiveDate) -> Result<Vec<Worksession>, ClientError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|s| s.is_on(day))
            .collect())
    }

    pub async fn get(&self, id: &WorksessionId) -> Result<Worksession, ClientError> {
        self.list()
            .await?
            .into_iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("worksession {}", id)))
    }

    /// The Monday..Sunday calendar for the week containing `date`.
    pub async fn week(&self, date: NaiveDate) -> Result<Vec<DaySchedule>, ClientError> {
        let sessions = self.list().await?;
        Ok(week_schedule(date, &sessions))
    }

    /// Validate a draft against `now` and store it.
    pub async fn create(
        &self,
        draft: &WorksessionDraft,
        now: NaiveDateTime,
    ) -> Result<Worksession, ClientError> {
        let session = draft.validate(now)?;
        let request = CreateWorksessionRequest::from(&session);

        let record: WorksessionRecord = self.http.post_json("/worksessions", &request).await?;
        let created = Worksession::try_from(record)?;
        info!(worksession_id = %created.id, start = %created.time_range.start(), "Worksession created");
        Ok(created)
    }
}
