//! Cross-group cycle scheduling with per-interventionist collision handling.
//!
//! Groups are processed strictly in the order given. Each group's accepted
//! times are claimed in a [`UsedSlotIndex`] before the next group runs, so
//! earlier groups win contested times.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::context::SchedulingContext;
use super::cycle::{group_not_found, no_cycle};
use super::engine::SchedulingEngine;
use super::scoring::SlotScorer;
use crate::services::scheduling::time::format_hhmm;
use crate::types::{BatchSchedulingOptions, CycleScheduleResult, ScheduledSession, TimeBlock};

/// Start times already claimed per interventionist and date within one batch.
#[derive(Debug, Default)]
pub struct UsedSlotIndex {
    claimed: HashMap<(Uuid, NaiveDate), HashSet<NaiveTime>>,
}

impl UsedSlotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, interventionist_id: Uuid, date: NaiveDate, time: NaiveTime) -> bool {
        self.claimed
            .get(&(interventionist_id, date))
            .map(|times| times.contains(&time))
            .unwrap_or(false)
    }

    pub fn claim(&mut self, interventionist_id: Uuid, date: NaiveDate, time: NaiveTime) {
        self.claimed
            .entry((interventionist_id, date))
            .or_default()
            .insert(time);
    }

    /// Number of claimed start times for one interventionist on one date.
    pub fn claimed_on(&self, interventionist_id: Uuid, date: NaiveDate) -> usize {
        self.claimed
            .get(&(interventionist_id, date))
            .map(HashSet::len)
            .unwrap_or(0)
    }
}

/// Move sessions whose start time is already claimed for the interventionist
/// on that date to the next unclaimed candidate. The search runs forward
/// from the proposed time and then wraps to earlier candidates. When every
/// candidate is claimed the original time is kept. Every accepted time is
/// claimed. Returns the indices of reassigned sessions.
pub fn balance_sessions(
    index: &mut UsedSlotIndex,
    interventionist_id: Uuid,
    sessions: &mut [ScheduledSession],
    candidates: &[TimeBlock],
) -> Vec<usize> {
    let mut reassigned = Vec::new();

    for (i, session) in sessions.iter_mut().enumerate() {
        if index.is_claimed(interventionist_id, session.date, session.time) {
            let proposed = session.time;
            let free = candidates
                .iter()
                .filter(|c| c.start_time > proposed)
                .chain(candidates.iter().filter(|c| c.start_time < proposed))
                .find(|c| !index.is_claimed(interventionist_id, session.date, c.start_time));

            match free {
                Some(slot) => {
                    debug!(
                        "Moved {} session from {} to {} for interventionist {}",
                        session.date,
                        format_hhmm(proposed),
                        format_hhmm(slot.start_time),
                        interventionist_id
                    );
                    session.time = slot.start_time;
                    session.end_time = slot.end_time;
                    reassigned.push(i);
                }
                None => warn!(
                    "No free slot for interventionist {} on {}, keeping colliding time {}",
                    interventionist_id,
                    session.date,
                    format_hhmm(proposed)
                ),
            }
        }

        index.claim(interventionist_id, session.date, session.time);
    }

    reassigned
}

/// Refresh the conflicts of sessions whose time changed.
fn reevaluate(ctx: &SchedulingContext, sessions: &mut [ScheduledSession], indices: &[usize]) {
    for &i in indices {
        let session = &mut sessions[i];
        if let Some(scorer) = SlotScorer::for_date(ctx, session.date) {
            session.conflicts = scorer.conflicts(&session.block());
        }
    }
}

impl SchedulingEngine {
    /// Cycle schedules for several groups, processed in slice order.
    ///
    /// `cycle_id` overrides `options.cycle.cycle_id`. With
    /// `balance_workload`, groups sharing an interventionist never receive
    /// the same start time on the same date unless no candidate is left.
    pub async fn auto_schedule_groups_for_cycle(
        &self,
        group_ids: &[Uuid],
        cycle_id: Option<Uuid>,
        options: &BatchSchedulingOptions,
    ) -> Result<HashMap<Uuid, CycleScheduleResult>> {
        let mut results = HashMap::with_capacity(group_ids.len());
        let cycle_id = cycle_id.or(options.cycle.cycle_id);

        let Some(cycle) = self.resolve_cycle(cycle_id).await else {
            for group_id in group_ids {
                results.insert(*group_id, CycleScheduleResult::failed(no_cycle(cycle_id)));
            }
            return Ok(results);
        };

        let candidates = self.candidate_slots(
            options.cycle.session_duration,
            options.cycle.start_hour,
            options.cycle.end_hour,
        );
        let mut used = UsedSlotIndex::new();
        let mut total_reassigned = 0;

        for group_id in group_ids {
            let Some(ctx) = self.load_context(*group_id).await? else {
                results.insert(*group_id, CycleScheduleResult::failed(group_not_found(*group_id)));
                continue;
            };

            let mut result = self.schedule_cycle_for_context(&ctx, &cycle, &options.cycle).await;

            if options.balance_workload {
                if let Some(interventionist_id) = ctx.interventionist_id() {
                    let moved = balance_sessions(&mut used, interventionist_id, &mut result.dates, &candidates);
                    reevaluate(&ctx, &mut result.dates, &moved);
                    total_reassigned += moved.len();
                }
            }

            results.insert(*group_id, result);
        }

        info!(
            "Auto-scheduled {} groups for cycle {} ({} sessions reassigned)",
            group_ids.len(),
            cycle.name,
            total_reassigned
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::repository::InMemoryStore;
    use crate::services::scheduling::test_support::*;
    use crate::services::scheduling::time::generate_time_slots;
    use crate::types::{CycleSchedulingOptions, ScheduleConflict, WeekDay};

    fn proposed(date: NaiveDate, h: u32, m: u32) -> ScheduledSession {
        let start = hm(h, m);
        ScheduledSession {
            date,
            day: WeekDay::from_date(date).unwrap(),
            time: start,
            end_time: crate::services::scheduling::time::add_minutes(start, 30),
            conflicts: Vec::new(),
        }
    }

    /// Two groups led by one interventionist, a one-day cycle on Monday
    /// 2025-09-08, and a preferred time of 09:00.
    fn shared_interventionist_setup() -> (InMemoryStore, Uuid, Uuid) {
        let person = interventionist(Vec::new());
        let a = group("1", Some(person.id));
        let b = group("2", Some(person.id));
        let (a_id, b_id) = (a.id, b.id);

        let mut store = InMemoryStore::new();
        store.interventionists.push(person);
        store.groups.push(a);
        store.groups.push(b);
        store.cycles.push(cycle(d(2025, 9, 8), d(2025, 9, 8)));
        (store, a_id, b_id)
    }

    fn batch_options(balance: bool) -> BatchSchedulingOptions {
        BatchSchedulingOptions {
            cycle: CycleSchedulingOptions {
                preferred_time: Some(hm(9, 0)),
                ..CycleSchedulingOptions::default()
            },
            balance_workload: balance,
        }
    }

    #[test]
    fn test_index_is_keyed_by_interventionist_and_date() {
        let mut index = UsedSlotIndex::new();
        let (p, q) = (Uuid::new_v4(), Uuid::new_v4());
        index.claim(p, d(2025, 9, 8), hm(9, 0));

        assert!(index.is_claimed(p, d(2025, 9, 8), hm(9, 0)));
        assert!(!index.is_claimed(q, d(2025, 9, 8), hm(9, 0)));
        assert!(!index.is_claimed(p, d(2025, 9, 9), hm(9, 0)));
        assert_eq!(index.claimed_on(p, d(2025, 9, 8)), 1);
    }

    #[test]
    fn test_collision_moves_to_next_free_candidate() {
        let p = Uuid::new_v4();
        let candidates = generate_time_slots(30, 7, 17, 15);
        let mut index = UsedSlotIndex::new();
        index.claim(p, d(2025, 9, 8), hm(9, 0));
        index.claim(p, d(2025, 9, 8), hm(9, 15));

        let mut sessions = vec![proposed(d(2025, 9, 8), 9, 0), proposed(d(2025, 9, 9), 9, 0)];
        let moved = balance_sessions(&mut index, p, &mut sessions, &candidates);

        assert_eq!(moved, vec![0]);
        assert_eq!(sessions[0].time, hm(9, 30));
        assert_eq!(sessions[0].end_time, hm(10, 0));
        // Tuesday was free
        assert_eq!(sessions[1].time, hm(9, 0));
        assert!(index.is_claimed(p, d(2025, 9, 8), hm(9, 30)));
        assert!(index.is_claimed(p, d(2025, 9, 9), hm(9, 0)));
    }

    #[test]
    fn test_search_wraps_to_earlier_candidates() {
        let p = Uuid::new_v4();
        let candidates = generate_time_slots(60, 9, 11, 60);
        let mut index = UsedSlotIndex::new();
        index.claim(p, d(2025, 9, 8), hm(10, 0));

        let mut sessions = vec![proposed(d(2025, 9, 8), 10, 0)];
        balance_sessions(&mut index, p, &mut sessions, &candidates);
        assert_eq!(sessions[0].time, hm(9, 0));
    }

    #[test]
    fn test_exhausted_candidates_keep_original_time() {
        let p = Uuid::new_v4();
        let candidates = generate_time_slots(60, 9, 10, 60);
        let mut index = UsedSlotIndex::new();
        index.claim(p, d(2025, 9, 8), hm(9, 0));

        let mut sessions = vec![proposed(d(2025, 9, 8), 9, 0)];
        let moved = balance_sessions(&mut index, p, &mut sessions, &candidates);

        assert!(moved.is_empty());
        assert_eq!(sessions[0].time, hm(9, 0));
        assert_eq!(index.claimed_on(p, d(2025, 9, 8)), 1);
    }

    #[tokio::test]
    async fn test_balancer_processing_order_decides_who_moves() {
        let (store, a_id, b_id) = shared_interventionist_setup();
        let e = engine(store);

        let forward = e
            .auto_schedule_groups_for_cycle(&[a_id, b_id], None, &batch_options(true))
            .await
            .unwrap();
        assert_eq!(forward[&a_id].dates[0].time, hm(9, 0));
        assert_eq!(forward[&b_id].dates[0].time, hm(9, 15));

        let reversed = e
            .auto_schedule_groups_for_cycle(&[b_id, a_id], None, &batch_options(true))
            .await
            .unwrap();
        assert_eq!(reversed[&b_id].dates[0].time, hm(9, 0));
        assert_eq!(reversed[&a_id].dates[0].time, hm(9, 15));
    }

    #[tokio::test]
    async fn test_without_balancing_groups_may_collide() {
        let (store, a_id, b_id) = shared_interventionist_setup();
        let e = engine(store);

        let results = e
            .auto_schedule_groups_for_cycle(&[a_id, b_id], None, &batch_options(false))
            .await
            .unwrap();
        assert_eq!(results[&a_id].dates[0].time, hm(9, 0));
        assert_eq!(results[&b_id].dates[0].time, hm(9, 0));
    }

    #[tokio::test]
    async fn test_reassigned_session_conflicts_are_refreshed() {
        let (mut store, a_id, b_id) = shared_interventionist_setup();
        // Group B's only student is out 09:30-10:00 on Mondays, which leaves
        // the 09:00 proposal clean but not the 09:15 fallback
        let pupil = student(b_id, "Cam");
        store.student_constraints.push(student_constraint(
            pupil.id,
            weekly(&[WeekDay::Monday], hm(9, 30), hm(10, 0)),
        ));
        store.students.push(pupil);
        let e = engine(store);

        let results = e
            .auto_schedule_groups_for_cycle(&[a_id, b_id], None, &batch_options(true))
            .await
            .unwrap();

        let moved = &results[&b_id].dates[0];
        assert_eq!(moved.time, hm(9, 15));
        assert!(matches!(
            moved.conflicts.as_slice(),
            [ScheduleConflict::StudentUnavailable { .. }]
        ));
    }

    #[tokio::test]
    async fn test_batch_reports_missing_group_and_continues() {
        let (store, a_id, _) = shared_interventionist_setup();
        let e = engine(store);
        let ghost = Uuid::new_v4();

        let results = e
            .auto_schedule_groups_for_cycle(&[ghost, a_id], None, &batch_options(true))
            .await
            .unwrap();

        assert!(matches!(
            results[&ghost].conflicts.as_slice(),
            [ScheduleConflict::GroupNotFound { .. }]
        ));
        assert_eq!(results[&a_id].total_sessions, 1);
    }

    #[tokio::test]
    async fn test_batch_without_cycle_fails_every_group() {
        let (mut store, a_id, b_id) = shared_interventionist_setup();
        store.cycles.clear();
        let e = engine(store);

        let results = e
            .auto_schedule_groups_for_cycle(&[a_id, b_id], None, &batch_options(true))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        for result in results.values() {
            assert!(matches!(result.conflicts.as_slice(), [ScheduleConflict::NoCycle { .. }]));
        }
    }
}
