//! Expands an instructional cycle into dated sessions, one per valid date.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::SchedulingContext;
use super::engine::{resolve_days, SchedulingEngine};
use super::scoring::{ScoreAdjustments, SlotEvaluation, SlotScorer};
use crate::types::{
    CycleScheduleResult, CycleSchedulingOptions, InstructionalCycle, ScheduleConflict, ScheduledSession,
    TimeBlock, WeekDay,
};

/// Preferred-weekday dates of a cycle split by the exclusion set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleDates {
    pub valid: Vec<NaiveDate>,
    pub skipped: Vec<NaiveDate>,
}

/// Every date in `[start, end]` falling on one of `days`, partitioned into
/// valid and excluded. Weekends never appear in either list.
pub fn partition_cycle_dates(
    start: NaiveDate,
    end: NaiveDate,
    days: &[WeekDay],
    excluded: &HashSet<NaiveDate>,
) -> CycleDates {
    let mut dates = CycleDates::default();

    for date in start.iter_days().take_while(|d| *d <= end) {
        let Some(day) = WeekDay::from_date(date) else {
            continue;
        };
        if !days.contains(&day) {
            continue;
        }
        if excluded.contains(&date) {
            dates.skipped.push(date);
        } else {
            dates.valid.push(date);
        }
    }

    dates
}

/// Lowest-scoring candidate; ties go to the earliest generated slot.
pub fn best_slot(
    scorer: &SlotScorer<'_>,
    candidates: &[TimeBlock],
    adjustments: &ScoreAdjustments,
) -> Option<(TimeBlock, SlotEvaluation)> {
    let mut best: Option<(TimeBlock, SlotEvaluation)> = None;
    for slot in candidates {
        let eval = scorer.evaluate(slot, adjustments);
        let better = match &best {
            Some((_, current)) => eval.score < current.score,
            None => true,
        };
        if better {
            best = Some((*slot, eval));
        }
    }
    best
}

/// Pick one slot per date in date order. Each accepted time becomes the
/// consistency anchor for the next date. The preferred time for a date is
/// `preferred_time`, else the group's own time for that weekday.
pub fn plan_cycle(
    ctx: &SchedulingContext,
    dates: &[NaiveDate],
    candidates: &[TimeBlock],
    preferred_time: Option<NaiveTime>,
) -> Vec<ScheduledSession> {
    let normalized = ctx.normalized_schedule();
    let mut planned = Vec::with_capacity(dates.len());
    let mut previous_time: Option<NaiveTime> = None;

    for date in dates {
        let Some(scorer) = SlotScorer::for_date(ctx, *date) else {
            continue;
        };
        let adjustments = ScoreAdjustments {
            preferred_time: preferred_time.or_else(|| normalized.time_for(scorer.day())),
            previous_time,
        };

        match best_slot(&scorer, candidates, &adjustments) {
            Some((slot, eval)) => {
                previous_time = Some(slot.start_time);
                planned.push(ScheduledSession {
                    date: *date,
                    day: scorer.day(),
                    time: slot.start_time,
                    end_time: slot.end_time,
                    conflicts: eval.conflicts,
                });
            }
            None => warn!("No candidate slots fit on {}", date),
        }
    }

    planned
}

impl SchedulingEngine {
    /// Cycle scheduling for an already loaded context and resolved cycle.
    pub(crate) async fn schedule_cycle_for_context(
        &self,
        ctx: &SchedulingContext,
        cycle: &InstructionalCycle,
        options: &CycleSchedulingOptions,
    ) -> CycleScheduleResult {
        let excluded = self.excluded_dates(cycle, Some(&ctx.group.grade_level)).await;
        let days = resolve_days(&options.preferred_days, &ctx.normalized_schedule().days());
        let dates = partition_cycle_dates(cycle.start_date, cycle.end_date, &days, &excluded);

        debug!(
            "Cycle {} for group {}: {} valid dates, {} skipped",
            cycle.name,
            ctx.group.name,
            dates.valid.len(),
            dates.skipped.len()
        );

        let candidates = self.candidate_slots(options.session_duration, options.start_hour, options.end_hour);
        let planned = plan_cycle(ctx, &dates.valid, &candidates, options.preferred_time);

        CycleScheduleResult {
            total_sessions: planned.len(),
            dates: planned,
            skipped_dates: dates.skipped,
            conflicts: Vec::new(),
        }
    }

    /// Dated sessions for one group across a cycle. A missing group or cycle
    /// is reported as a conflict on an empty result.
    pub async fn generate_cycle_schedule(
        &self,
        group_id: Uuid,
        options: &CycleSchedulingOptions,
    ) -> Result<CycleScheduleResult> {
        let Some(ctx) = self.load_context(group_id).await? else {
            return Ok(CycleScheduleResult::failed(group_not_found(group_id)));
        };

        let Some(cycle) = self.resolve_cycle(options.cycle_id).await else {
            return Ok(CycleScheduleResult::failed(no_cycle(options.cycle_id)));
        };

        let result = self.schedule_cycle_for_context(&ctx, &cycle, options).await;
        info!(
            "Scheduled {} sessions for group {} in cycle {} ({} dates skipped)",
            result.total_sessions,
            ctx.group.name,
            cycle.name,
            result.skipped_dates.len()
        );
        Ok(result)
    }
}

pub(crate) fn group_not_found(group_id: Uuid) -> ScheduleConflict {
    ScheduleConflict::GroupNotFound {
        description: format!("Group {} not found", group_id),
    }
}

pub(crate) fn no_cycle(cycle_id: Option<Uuid>) -> ScheduleConflict {
    let description = match cycle_id {
        Some(id) => format!("Instructional cycle {} not found", id),
        None => "No active instructional cycle".to_string(),
    };
    ScheduleConflict::NoCycle { description }
}
