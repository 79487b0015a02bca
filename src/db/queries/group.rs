//! Group, roster, interventionist and constraint queries

use anyhow::Result;
use chrono::NaiveTime;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

use crate::types::{
    GradeConstraint, Group, GroupSchedule, Interventionist, Student, StudentConstraint, WeekDay,
    WeeklyTimeBlock,
};

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    grade_level: String,
    interventionist_id: Option<Uuid>,
    schedule: Json<GroupSchedule>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            name: row.name,
            grade_level: row.grade_level,
            interventionist_id: row.interventionist_id,
            schedule: row.schedule.0,
        }
    }
}

#[derive(Debug, FromRow)]
struct StudentRow {
    id: Uuid,
    group_id: Uuid,
    first_name: String,
    last_name: String,
}

#[derive(Debug, FromRow)]
struct InterventionistRow {
    id: Uuid,
    name: String,
    availability: Json<Vec<WeeklyTimeBlock>>,
}

#[derive(Debug, FromRow)]
struct GradeConstraintRow {
    id: Uuid,
    grade_level: String,
    label: String,
    days: Vec<String>,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

#[derive(Debug, FromRow)]
struct StudentConstraintRow {
    id: Uuid,
    student_id: Uuid,
    reason: String,
    days: Vec<String>,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

fn window(id: Uuid, days: &[String], start_time: NaiveTime, end_time: NaiveTime) -> WeeklyTimeBlock {
    WeeklyTimeBlock {
        days: parse_days(id, days),
        start_time,
        end_time,
    }
}

/// Unknown day names (including weekends) are dropped with a warning.
fn parse_days(constraint_id: Uuid, raw: &[String]) -> Vec<WeekDay> {
    raw.iter()
        .filter_map(|d| {
            let day = WeekDay::parse(d);
            if day.is_none() {
                warn!("Constraint {} has unknown day '{}', ignoring", constraint_id, d);
            }
            day
        })
        .collect()
}

/// Get a group by id
pub async fn get_group(pool: &PgPool, group_id: Uuid) -> Result<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, grade_level, interventionist_id, schedule
        FROM intervention_groups
        WHERE id = $1
        "#,
    )
    .bind(group_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Group::from))
}

/// List groups led by an interventionist
pub async fn list_groups_for_interventionist(
    pool: &PgPool,
    interventionist_id: Uuid,
) -> Result<Vec<Group>> {
    let rows = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, grade_level, interventionist_id, schedule
        FROM intervention_groups
        WHERE interventionist_id = $1
        ORDER BY name ASC
        "#,
    )
    .bind(interventionist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Group::from).collect())
}

/// List the students of a group
pub async fn list_students(pool: &PgPool, group_id: Uuid) -> Result<Vec<Student>> {
    let rows = sqlx::query_as::<_, StudentRow>(
        r#"
        SELECT id, group_id, first_name, last_name
        FROM students
        WHERE group_id = $1
        ORDER BY last_name ASC, first_name ASC
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Student {
            id: r.id,
            group_id: r.group_id,
            first_name: r.first_name,
            last_name: r.last_name,
        })
        .collect())
}

/// Get an interventionist with their weekly availability
pub async fn get_interventionist(pool: &PgPool, interventionist_id: Uuid) -> Result<Option<Interventionist>> {
    let row = sqlx::query_as::<_, InterventionistRow>(
        r#"
        SELECT id, name, availability
        FROM interventionists
        WHERE id = $1
        "#,
    )
    .bind(interventionist_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| Interventionist {
        id: r.id,
        name: r.name,
        availability: r.availability.0,
    }))
}

/// Blackout windows for a whole grade
pub async fn list_grade_constraints(pool: &PgPool, grade_level: &str) -> Result<Vec<GradeConstraint>> {
    let rows = sqlx::query_as::<_, GradeConstraintRow>(
        r#"
        SELECT id, grade_level, label, days, start_time, end_time
        FROM grade_constraints
        WHERE grade_level = $1
        ORDER BY start_time ASC
        "#,
    )
    .bind(grade_level)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| GradeConstraint {
            window: window(r.id, &r.days, r.start_time, r.end_time),
            id: r.id,
            grade_level: r.grade_level,
            label: r.label,
        })
        .collect())
}

/// Blackout windows for individual students
pub async fn list_student_constraints(pool: &PgPool, student_ids: &[Uuid]) -> Result<Vec<StudentConstraint>> {
    let rows = sqlx::query_as::<_, StudentConstraintRow>(
        r#"
        SELECT id, student_id, reason, days, start_time, end_time
        FROM student_constraints
        WHERE student_id = ANY($1)
        ORDER BY start_time ASC
        "#,
    )
    .bind(student_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| StudentConstraint {
            window: window(r.id, &r.days, r.start_time, r.end_time),
            id: r.id,
            student_id: r.student_id,
            reason: r.reason,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days_drops_unknown_names() {
        let raw = vec![
            "monday".to_string(),
            "Saturday".to_string(),
            "friday".to_string(),
        ];
        assert_eq!(
            parse_days(Uuid::nil(), &raw),
            vec![WeekDay::Monday, WeekDay::Friday]
        );
    }
}
