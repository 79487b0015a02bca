//! Session load statistics for one interventionist over a date range.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{NaiveDate, Timelike};
use tracing::debug;
use uuid::Uuid;

use super::engine::SchedulingEngine;
use crate::types::{InterventionistWorkload, Session, WeekDay};

/// `ceil(inclusive_days * 5 / 7)`. Non-instructional days are not
/// subtracted. Empty or inverted ranges count as zero.
pub fn approximate_school_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = (end - start).num_days() + 1;
    if days <= 0 {
        return 0;
    }
    ((days * 5 + 6) / 7) as u32
}

/// Histogram over active, timed sessions. Sessions on weekends count toward
/// the total and the hour map but have no weekday bucket.
pub fn summarize_workload<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    school_days: u32,
) -> InterventionistWorkload {
    let mut workload = InterventionistWorkload::default();

    for session in sessions {
        let Some(time) = session.time else {
            continue;
        };
        if !session.is_active() {
            continue;
        }

        workload.total_sessions += 1;
        if let Some(day) = WeekDay::from_date(session.date) {
            *workload.sessions_by_day.entry(day).or_insert(0) += 1;
        }
        *workload.sessions_by_hour.entry(time.hour()).or_insert(0) += 1;
    }

    workload.average_per_day = if school_days == 0 {
        0.0
    } else {
        workload.total_sessions as f64 / school_days as f64
    };
    workload
}

impl SchedulingEngine {
    /// Workload across every group the interventionist leads, for sessions
    /// dated within `[start, end]`.
    pub async fn get_interventionist_workload(
        &self,
        interventionist_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<InterventionistWorkload> {
        let groups: HashSet<Uuid> = self
            .group_repository()
            .groups_for_interventionist(interventionist_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        if groups.is_empty() {
            debug!("Interventionist {} leads no groups", interventionist_id);
            return Ok(summarize_workload(std::iter::empty(), approximate_school_days(start, end)));
        }

        let sessions = self
            .session_repository()
            .list_sessions(Some((start, end)))
            .await?;

        let led = sessions
            .iter()
            .filter(|s| groups.contains(&s.group_id))
            .filter(|s| s.date >= start && s.date <= end);

        let workload = summarize_workload(led, approximate_school_days(start, end));
        debug!(
            "Workload for {}: {} sessions over {} groups",
            interventionist_id,
            workload.total_sessions,
            groups.len()
        );
        Ok(workload)
    }
}
