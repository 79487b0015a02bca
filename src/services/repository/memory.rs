//! In-memory collaborators loaded from a JSON fixture

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalendarService, GroupRepository, SessionRepository};
use crate::types::{
    CalendarEvent, GradeConstraint, Group, InstructionalCycle, Interventionist, Session, Student,
    StudentConstraint,
};

/// Snapshot of everything the engine reads. Implements all three
/// collaborator traits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InMemoryStore {
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub interventionists: Vec<Interventionist>,
    pub grade_constraints: Vec<GradeConstraint>,
    pub student_constraints: Vec<StudentConstraint>,
    pub sessions: Vec<Session>,
    pub cycles: Vec<InstructionalCycle>,
    pub calendar_events: Vec<CalendarEvent>,
    /// Makes every calendar call fail (exercises degraded paths)
    #[serde(skip)]
    pub calendar_unavailable: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture {}", path.display()))
    }

    fn ensure_calendar(&self) -> Result<()> {
        if self.calendar_unavailable {
            anyhow::bail!("calendar service unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
        Ok(self.groups.iter().find(|g| g.id == group_id).cloned())
    }

    async fn list_students(&self, group_id: Uuid) -> Result<Vec<Student>> {
        Ok(self
            .students
            .iter()
            .filter(|s| s.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn get_interventionist(&self, interventionist_id: Uuid) -> Result<Option<Interventionist>> {
        Ok(self
            .interventionists
            .iter()
            .find(|i| i.id == interventionist_id)
            .cloned())
    }

    async fn grade_constraints(&self, grade_level: &str) -> Result<Vec<GradeConstraint>> {
        Ok(self
            .grade_constraints
            .iter()
            .filter(|c| c.grade_level == grade_level)
            .cloned()
            .collect())
    }

    async fn student_constraints(&self, student_ids: &[Uuid]) -> Result<Vec<StudentConstraint>> {
        Ok(self
            .student_constraints
            .iter()
            .filter(|c| student_ids.contains(&c.student_id))
            .cloned()
            .collect())
    }

    async fn groups_for_interventionist(&self, interventionist_id: Uuid) -> Result<Vec<Group>> {
        Ok(self
            .groups
            .iter()
            .filter(|g| g.interventionist_id == Some(interventionist_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn list_sessions(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<Session>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| match range {
                Some((start, end)) => start <= s.date && s.date <= end,
                None => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CalendarService for InMemoryStore {
    async fn current_cycle(&self) -> Result<Option<InstructionalCycle>> {
        self.ensure_calendar()?;
        if let Some(flagged) = self.cycles.iter().find(|c| c.is_current) {
            return Ok(Some(flagged.clone()));
        }
        let today = Utc::now().date_naive();
        Ok(self.cycles.iter().find(|c| c.contains(today)).cloned())
    }

    async fn get_cycle(&self, cycle_id: Uuid) -> Result<Option<InstructionalCycle>> {
        self.ensure_calendar()?;
        Ok(self.cycles.iter().find(|c| c.id == cycle_id).cloned())
    }

    async fn non_instructional_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        grade_level: Option<&str>,
    ) -> Result<Vec<NaiveDate>> {
        self.ensure_calendar()?;
        let mut dates: Vec<NaiveDate> = self
            .calendar_events
            .iter()
            .filter(|e| start <= e.date && e.date <= end && e.applies_to(grade_level))
            .map(|e| e.date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    fn name(&self) -> &str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cycle(start: NaiveDate, end: NaiveDate, is_current: bool) -> InstructionalCycle {
        InstructionalCycle {
            id: Uuid::new_v4(),
            name: "Cycle".to_string(),
            start_date: start,
            end_date: end,
            is_current,
        }
    }

    #[tokio::test]
    async fn test_flagged_cycle_is_current() {
        let mut store = InMemoryStore::new();
        store.cycles.push(cycle(d(2020, 1, 6), d(2020, 2, 14), false));
        store.cycles.push(cycle(d(2020, 2, 17), d(2020, 3, 27), true));

        let current = store.current_cycle().await.unwrap().unwrap();
        assert_eq!(current.start_date, d(2020, 2, 17));
    }

    #[tokio::test]
    async fn test_non_instructional_dates_filters_range_and_grade() {
        let mut store = InMemoryStore::new();
        for (date, grades) in [
            (d(2025, 9, 1), vec![]),
            (d(2025, 9, 12), vec!["K".to_string()]),
            (d(2025, 10, 13), vec![]),
        ] {
            store.calendar_events.push(CalendarEvent {
                date,
                event_type: "holiday".to_string(),
                title: String::new(),
                grade_levels: grades,
            });
        }

        let dates = store
            .non_instructional_dates(d(2025, 9, 1), d(2025, 9, 30), Some("2"))
            .await
            .unwrap();
        assert_eq!(dates, vec![d(2025, 9, 1)]);

        let all = store
            .non_instructional_dates(d(2025, 9, 1), d(2025, 9, 30), None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_calendar_errors() {
        let store = InMemoryStore {
            calendar_unavailable: true,
            ..InMemoryStore::default()
        };
        assert!(store.current_cycle().await.is_err());
        assert_eq!(store.name(), "InMemory");
    }

    #[test]
    fn test_fixture_parses_with_missing_sections() {
        let store: InMemoryStore = serde_json::from_str(r#"{"groups":[]}"#).unwrap();
        assert!(store.sessions.is_empty());
        assert!(!store.calendar_unavailable);
    }
}
