//! Worksession scheduling: time ranges, draft validation and the weekly
//! calendar view.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{ScheduleError, TaskId, UserId, WorksessionId};

/// Longest worksession that can be scheduled, in hours.
pub const MAX_DURATION_HOURS: f64 = 8.0;

/// Shortest worksession that can be scheduled, in hours.
pub const MIN_DURATION_HOURS: f64 = 0.5;

/// A half-open wall-clock interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeRange {
    /// Create a range, rejecting one that does not end after it starts.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Calendar day the range starts on.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }
}

/// A scheduled block of study time on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Worksession {
    pub id: WorksessionId,
    pub title: String,
    pub time_range: TimeRange,
    /// Task being worked on.
    pub subject_id: TaskId,
    /// User who owns the session.
    pub collaborator_id: UserId,
}

impl Worksession {
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.time_range.day() == day
    }
}

/// A validated worksession that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorksession {
    pub title: String,
    pub time_range: TimeRange,
    pub subject_id: TaskId,
    pub collaborator_id: UserId,
}

/// Raw input from the scheduling form.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksessionDraft {
    pub title: String,
    pub subject_id: Option<TaskId>,
    pub start: NaiveDateTime,
    /// Duration in hours, as typed.
    pub duration_hours: String,
    pub collaborator_id: Option<UserId>,
}

impl WorksessionDraft {
    /// Check the draft against `now` and turn it into a storable session.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self, now: NaiveDateTime) -> Result<NewWorksession, ScheduleError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ScheduleError::MissingTitle);
        }

        let subject_id = self
            .subject_id
            .clone()
            .ok_or(ScheduleError::MissingSubject)?;

        if self.start < now {
            return Err(ScheduleError::StartsInPast);
        }

        let hours = self
            .duration_hours
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h > 0.0)
            .ok_or(ScheduleError::InvalidDuration)?;

        if hours > MAX_DURATION_HOURS {
            return Err(ScheduleError::TooLong {
                hours,
                max: MAX_DURATION_HOURS,
            });
        }
        if hours < MIN_DURATION_HOURS {
            return Err(ScheduleError::TooShort {
                hours,
                min: MIN_DURATION_HOURS,
            });
        }

        let collaborator_id = self
            .collaborator_id
            .clone()
            .ok_or(ScheduleError::MissingCollaborator)?;

        let millis = (hours * 3_600_000.0).round() as i64;
        let end = self.start + Duration::milliseconds(millis);

        Ok(NewWorksession {
            title: title.to_string(),
            time_range: TimeRange::new(self.start, end)?,
            subject_id,
            collaborator_id,
        })
    }
}

/// One day of the weekly calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub key: NaiveDate,
    /// Display label such as `Monday 3 March`.
    pub label: String,
    /// Sessions starting on this day, earliest first.
    pub sessions: Vec<Worksession>,
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Bucket sessions into the Monday..Sunday week containing `date`.
///
/// Sessions outside that week are dropped.
pub fn week_schedule(date: NaiveDate, sessions: &[Worksession]) -> Vec<DaySchedule> {
    let monday = week_start(date);

    (0..7)
        .map(|offset| {
            let key = monday + Duration::days(offset);
            let mut day_sessions: Vec<Worksession> =
                sessions.iter().filter(|s| s.is_on(key)).cloned().collect();
            day_sessions.sort_by_key(|s| s.time_range.start());

            DaySchedule {
                key,
                label: key.format("%A %-d %B").to_string(),
                sessions: day_sessions,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn draft(duration: &str) -> WorksessionDraft {
        WorksessionDraft {
            title: "  Revise  ".to_string(),
            subject_id: Some(TaskId::new("t1")),
            start: at(2025, 3, 5, 14, 0),
            duration_hours: duration.to_string(),
            collaborator_id: Some(UserId::new("u1")),
        }
    }

    fn session(id: &str, start: NaiveDateTime) -> Worksession {
        Worksession {
            id: WorksessionId::new(id),
            title: id.to_string(),
            time_range: TimeRange::new(start, start + Duration::hours(1)).unwrap(),
            subject_id: TaskId::new("t1"),
            collaborator_id: UserId::new("u1"),
        }
    }

    #[test]
    fn test_time_range_rejects_empty() {
        let t = at(2025, 3, 5, 10, 0);
        assert_eq!(TimeRange::new(t, t), Err(ScheduleError::EmptyRange));
        assert!(TimeRange::new(t, t - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_valid_draft() {
        let now = at(2025, 3, 5, 9, 0);
        let session = draft("1.5").validate(now).unwrap();
        assert_eq!(session.title, "Revise");
        assert_eq!(session.time_range.end(), at(2025, 3, 5, 15, 30));
        assert_eq!(session.time_range.duration(), Duration::minutes(90));
    }

    #[test]
    fn test_duration_bounds() {
        let now = at(2025, 3, 5, 9, 0);
        assert!(draft("0.5").validate(now).is_ok());
        assert!(draft("8").validate(now).is_ok());
        assert!(matches!(
            draft("8.25").validate(now),
            Err(ScheduleError::TooLong { .. })
        ));
        assert!(matches!(
            draft("0.25").validate(now),
            Err(ScheduleError::TooShort { .. })
        ));
        assert_eq!(draft("0").validate(now), Err(ScheduleError::InvalidDuration));
        assert_eq!(draft("abc").validate(now), Err(ScheduleError::InvalidDuration));
        assert_eq!(draft("NaN").validate(now), Err(ScheduleError::InvalidDuration));
    }

    #[test]
    fn test_validation_order() {
        let now = at(2025, 3, 6, 9, 0);
        let mut d = draft("nonsense");
        d.title = " ".to_string();
        d.subject_id = None;
        assert_eq!(d.validate(now), Err(ScheduleError::MissingTitle));

        d.title = "ok".to_string();
        assert_eq!(d.validate(now), Err(ScheduleError::MissingSubject));

        d.subject_id = Some(TaskId::new("t1"));
        assert_eq!(d.validate(now), Err(ScheduleError::StartsInPast));

        d.start = at(2025, 3, 7, 9, 0);
        assert_eq!(d.validate(now), Err(ScheduleError::InvalidDuration));

        d.duration_hours = "1".to_string();
        d.collaborator_id = None;
        assert_eq!(d.validate(now), Err(ScheduleError::MissingCollaborator));
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2025-03-05 is a Wednesday, 2025-03-09 a Sunday.
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(week_start(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()), monday);
        assert_eq!(week_start(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()), monday);
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn test_week_schedule_buckets_and_sorts() {
        let sessions = vec![
            session("late", at(2025, 3, 4, 16, 0)),
            session("early", at(2025, 3, 4, 8, 30)),
            session("sunday", at(2025, 3, 9, 10, 0)),
            session("next-week", at(2025, 3, 10, 10, 0)),
        ];

        let week = week_schedule(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(), &sessions);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].key, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(week[0].label, "Monday 3 March");
        assert!(week[0].sessions.is_empty());

        let tuesday: Vec<&str> = week[1].sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(tuesday, vec!["early", "late"]);

        assert_eq!(week[6].label, "Sunday 9 March");
        assert_eq!(week[6].sessions.len(), 1);

        let total: usize = week.iter().map(|d| d.sessions.len()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_day_key_serializes_as_date() {
        let week = week_schedule(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), &[]);
        let json = serde_json::to_value(&week[0]).unwrap();
        assert_eq!(json["key"], "2025-03-03");
    }
}
