//! Postgres-backed collaborators for the scheduling engine

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::queries;
use crate::services::repository::{CalendarService, GroupRepository, SessionRepository};
use crate::types::{
    GradeConstraint, Group, InstructionalCycle, Interventionist, Session, Student, StudentConstraint,
};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgRepository {
    async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
        queries::group::get_group(&self.pool, group_id).await
    }

    async fn list_students(&self, group_id: Uuid) -> Result<Vec<Student>> {
        queries::group::list_students(&self.pool, group_id).await
    }

    async fn get_interventionist(&self, interventionist_id: Uuid) -> Result<Option<Interventionist>> {
        queries::group::get_interventionist(&self.pool, interventionist_id).await
    }

    async fn grade_constraints(&self, grade_level: &str) -> Result<Vec<GradeConstraint>> {
        queries::group::list_grade_constraints(&self.pool, grade_level).await
    }

    async fn student_constraints(&self, student_ids: &[Uuid]) -> Result<Vec<StudentConstraint>> {
        queries::group::list_student_constraints(&self.pool, student_ids).await
    }

    async fn groups_for_interventionist(&self, interventionist_id: Uuid) -> Result<Vec<Group>> {
        queries::group::list_groups_for_interventionist(&self.pool, interventionist_id).await
    }
}

#[async_trait]
impl SessionRepository for PgRepository {
    async fn list_sessions(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Vec<Session>> {
        queries::session::list_sessions(&self.pool, range).await
    }
}

#[async_trait]
impl CalendarService for PgRepository {
    async fn current_cycle(&self) -> Result<Option<InstructionalCycle>> {
        queries::calendar::get_current_cycle(&self.pool).await
    }

    async fn get_cycle(&self, cycle_id: Uuid) -> Result<Option<InstructionalCycle>> {
        queries::calendar::get_cycle(&self.pool, cycle_id).await
    }

    async fn non_instructional_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        grade_level: Option<&str>,
    ) -> Result<Vec<NaiveDate>> {
        queries::calendar::list_non_instructional_dates(&self.pool, start, end, grade_level).await
    }

    fn name(&self) -> &str {
        "Postgres"
    }
}
