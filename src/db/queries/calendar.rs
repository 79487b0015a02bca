//! Instructional cycle and calendar queries

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::types::InstructionalCycle;

/// The flagged current cycle, else the cycle containing today
pub async fn get_current_cycle(pool: &PgPool) -> Result<Option<InstructionalCycle>> {
    let cycle = sqlx::query_as::<_, InstructionalCycle>(
        r#"
        SELECT id, name, start_date, end_date, is_current
        FROM instructional_cycles
        WHERE is_current OR CURRENT_DATE BETWEEN start_date AND end_date
        ORDER BY is_current DESC, start_date DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(cycle)
}

/// Get a cycle by id
pub async fn get_cycle(pool: &PgPool, cycle_id: Uuid) -> Result<Option<InstructionalCycle>> {
    let cycle = sqlx::query_as::<_, InstructionalCycle>(
        r#"
        SELECT id, name, start_date, end_date, is_current
        FROM instructional_cycles
        WHERE id = $1
        "#,
    )
    .bind(cycle_id)
    .fetch_optional(pool)
    .await?;

    Ok(cycle)
}

/// Distinct non-instructional dates in `[start, end]`. With a grade level,
/// school-wide events and events naming that grade are included.
pub async fn list_non_instructional_dates(
    pool: &PgPool,
    start: NaiveDate,
    end: NaiveDate,
    grade_level: Option<&str>,
) -> Result<Vec<NaiveDate>> {
    let rows: Vec<(NaiveDate,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT date
        FROM calendar_events
        WHERE date BETWEEN $1 AND $2
          AND ($3::text IS NULL OR cardinality(grade_levels) = 0 OR $3 = ANY(grade_levels))
        ORDER BY date ASC
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(grade_level)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(d,)| d).collect())
}
