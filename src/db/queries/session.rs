//! Session database queries

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::{Session, SessionStatus};

#[derive(Debug, FromRow)]
struct SessionRow {
    id: Uuid,
    group_id: Uuid,
    date: NaiveDate,
    time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    status: String,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id,
            group_id: row.group_id,
            date: row.date,
            time: row.time,
            end_time: row.end_time,
            status: SessionStatus::parse(&row.status),
        }
    }
}

/// List sessions of every group, optionally within an inclusive date range
pub async fn list_sessions(
    pool: &PgPool,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Session>> {
    let rows = match range {
        Some((start, end)) => {
            sqlx::query_as::<_, SessionRow>(
                r#"
                SELECT id, group_id, date, time, end_time, status
                FROM intervention_sessions
                WHERE date BETWEEN $1 AND $2
                ORDER BY date ASC, time ASC NULLS LAST
                "#,
            )
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SessionRow>(
                r#"
                SELECT id, group_id, date, time, end_time, status
                FROM intervention_sessions
                ORDER BY date ASC, time ASC NULLS LAST
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(Session::from).collect())
}
