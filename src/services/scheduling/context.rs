//! Per-request snapshot of everything a group's scheduling depends on.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use super::constraints::student_blocked_times;
use super::normalize::{normalize_schedule, NormalizedSchedule};
use crate::services::repository::{GroupRepository, SessionRepository};
use crate::types::{
    GradeConstraint, Group, Interventionist, Session, Student, StudentConstraint, TimeBlock, WeekDay,
};

#[derive(Debug, Clone)]
pub struct SchedulingContext {
    pub group: Group,
    pub roster: Vec<Student>,
    pub interventionist: Option<Interventionist>,
    pub grade_constraints: Vec<GradeConstraint>,
    pub student_constraints: Vec<StudentConstraint>,
    /// Every non-cancelled session in the system, not only this group's
    pub existing_sessions: Vec<Session>,
}

impl SchedulingContext {
    /// Load the context for `group_id`. `Ok(None)` when the group does not exist.
    pub async fn load(
        groups: &dyn GroupRepository,
        sessions: &dyn SessionRepository,
        group_id: Uuid,
    ) -> Result<Option<Self>> {
        let group = match groups.get_group(group_id).await? {
            Some(g) => g,
            None => {
                warn!("Group {} not found", group_id);
                return Ok(None);
            }
        };

        let roster = groups.list_students(group_id).await?;

        let interventionist = match group.interventionist_id {
            Some(id) => {
                let found = groups.get_interventionist(id).await?;
                if found.is_none() {
                    warn!("Group {} references missing interventionist {}", group_id, id);
                }
                found
            }
            None => None,
        };

        let grade_constraints = groups.grade_constraints(&group.grade_level).await?;

        let student_ids: Vec<Uuid> = roster.iter().map(|s| s.id).collect();
        let student_constraints = if student_ids.is_empty() {
            vec![]
        } else {
            groups.student_constraints(&student_ids).await?
        };

        let existing_sessions: Vec<Session> = sessions
            .list_sessions(None)
            .await?
            .into_iter()
            .filter(Session::is_active)
            .collect();

        debug!(
            "Loaded context for group {}: {} students, {} grade constraints, {} student constraints, {} sessions",
            group_id,
            roster.len(),
            grade_constraints.len(),
            student_constraints.len(),
            existing_sessions.len()
        );

        Ok(Some(Self {
            group,
            roster,
            interventionist,
            grade_constraints,
            student_constraints,
            existing_sessions,
        }))
    }

    pub fn normalized_schedule(&self) -> NormalizedSchedule {
        normalize_schedule(&self.group.schedule)
    }

    pub fn student_blocks(&self, day: WeekDay) -> HashMap<Uuid, Vec<TimeBlock>> {
        student_blocked_times(
            day,
            &self.group.grade_level,
            &self.roster,
            &self.grade_constraints,
            &self.student_constraints,
        )
    }

    /// Weekly view: sessions falling on `day` on any date.
    pub fn sessions_on_weekday(&self, day: WeekDay) -> Vec<&Session> {
        self.existing_sessions
            .iter()
            .filter(|s| WeekDay::from_date(s.date) == Some(day))
            .collect()
    }

    /// Cycle view: sessions booked on exactly `date`.
    pub fn sessions_on_date(&self, date: NaiveDate) -> Vec<&Session> {
        self.existing_sessions.iter().filter(|s| s.date == date).collect()
    }

    /// Assigned interventionist, even when their record could not be loaded.
    pub fn interventionist_id(&self) -> Option<Uuid> {
        self.group.interventionist_id
    }
}
