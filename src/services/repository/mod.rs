//! Collaborators the scheduling engine reads from.
//!
//! Postgres implementations live in `db::repository`; `InMemoryStore` backs
//! tests and the offline `plan` command.

mod memory;

pub use memory::InMemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{
    GradeConstraint, Group, InstructionalCycle, Interventionist, Session, Student, StudentConstraint,
};

/// Groups, rosters, interventionists and blackout records
#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>>;

    async fn list_students(&self, group_id: Uuid) -> Result<Vec<Student>>;

    async fn get_interventionist(&self, interventionist_id: Uuid) -> Result<Option<Interventionist>>;

    async fn grade_constraints(&self, grade_level: &str) -> Result<Vec<GradeConstraint>>;

    async fn student_constraints(&self, student_ids: &[Uuid]) -> Result<Vec<StudentConstraint>>;

    async fn groups_for_interventionist(&self, interventionist_id: Uuid) -> Result<Vec<Group>>;
}

/// Booked sessions across every group
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// All sessions (any status), optionally restricted to an inclusive date range.
    async fn list_sessions(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<Session>>;
}

/// Instructional cycles and non-instructional days
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn current_cycle(&self) -> Result<Option<InstructionalCycle>>;

    async fn get_cycle(&self, cycle_id: Uuid) -> Result<Option<InstructionalCycle>>;

    /// Non-instructional dates in `[start, end]`. With a grade level, only
    /// events affecting that grade are returned.
    async fn non_instructional_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        grade_level: Option<&str>,
    ) -> Result<Vec<NaiveDate>>;

    /// Get service name for logging
    fn name(&self) -> &str;
}
