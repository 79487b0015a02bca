//! Weekly recurring slot search and day-diversified selection.

use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use super::context::SchedulingContext;
use super::engine::{resolve_days, SchedulingEngine};
use super::scoring::{ScoreAdjustments, SlotScorer, CONFLICT_PENALTY};
use crate::defaults::MAX_WEEKLY_SUGGESTIONS;
use crate::types::{SchedulingOptions, SuggestedTimeSlot, TimeBlock, WeekDay};

/// Slots scoring below this tolerate at most one conflict.
const FALLBACK_SCORE_LIMIT: i32 = 2 * CONFLICT_PENALTY;

/// Score every candidate on every day, ascending by score. Ties keep
/// enumeration order (day order, then start time).
pub fn rank_weekly_slots(
    ctx: &SchedulingContext,
    days: &[WeekDay],
    candidates: &[TimeBlock],
) -> Vec<SuggestedTimeSlot> {
    let mut ranked = Vec::with_capacity(days.len() * candidates.len());
    let adjustments = ScoreAdjustments::default();

    for day in days {
        let scorer = SlotScorer::for_weekday(ctx, *day);
        for slot in candidates {
            let eval = scorer.evaluate(slot, &adjustments);
            ranked.push(SuggestedTimeSlot {
                day: *day,
                start_time: slot.start_time,
                end_time: slot.end_time,
                score: eval.score,
                conflicts: eval.conflicts,
            });
        }
    }

    ranked.sort_by_key(|s| s.score);
    ranked
}

/// Conflict-free slots when there are enough of them, otherwise every slot
/// with at most one conflict's worth of penalty.
pub fn selection_pool(ranked: &[SuggestedTimeSlot], count: usize) -> Vec<SuggestedTimeSlot> {
    let clean: Vec<SuggestedTimeSlot> = ranked
        .iter()
        .filter(|s| s.conflicts.is_empty())
        .cloned()
        .collect();

    if clean.len() >= count {
        return clean;
    }

    debug!(
        "Only {} conflict-free slots for {} sessions, relaxing to score < {}",
        clean.len(),
        count,
        FALLBACK_SCORE_LIMIT
    );
    ranked
        .iter()
        .filter(|s| s.score < FALLBACK_SCORE_LIMIT)
        .cloned()
        .collect()
}

/// Two-pass greedy: one slot per distinct weekday in score order, then
/// fill the remainder in score order allowing repeated days.
pub fn select_diverse_slots(ranked: &[SuggestedTimeSlot], count: usize) -> Vec<SuggestedTimeSlot> {
    let mut taken = vec![false; ranked.len()];
    let mut used_days: HashSet<WeekDay> = HashSet::new();
    let mut selected = Vec::with_capacity(count);

    for (i, slot) in ranked.iter().enumerate() {
        if selected.len() >= count {
            break;
        }
        if used_days.insert(slot.day) {
            taken[i] = true;
            selected.push(slot.clone());
        }
    }

    for (i, slot) in ranked.iter().enumerate() {
        if selected.len() >= count {
            break;
        }
        if !taken[i] {
            taken[i] = true;
            selected.push(slot.clone());
        }
    }

    selected
}

impl SchedulingEngine {
    fn weekly_ranking(&self, ctx: &SchedulingContext, options: &SchedulingOptions) -> Vec<SuggestedTimeSlot> {
        let requested = options.preferred_days.clone().unwrap_or_default();
        let days = resolve_days(&requested, &ctx.normalized_schedule().days());
        let candidates = self.candidate_slots(options.session_duration, options.start_hour, options.end_hour);

        let mut ranked = rank_weekly_slots(ctx, &days, &candidates);
        ranked.truncate(MAX_WEEKLY_SUGGESTIONS);
        ranked
    }

    /// Top ranked weekly slots for a group. Unknown groups yield no slots.
    pub async fn find_available_slots(
        &self,
        group_id: Uuid,
        options: &SchedulingOptions,
    ) -> Result<Vec<SuggestedTimeSlot>> {
        let Some(ctx) = self.load_context(group_id).await? else {
            return Ok(vec![]);
        };
        Ok(self.weekly_ranking(&ctx, options))
    }

    /// Up to `sessions_per_week` slots spread across distinct weekdays.
    /// Falls back to the group's normalized session count.
    pub async fn suggest_schedule(
        &self,
        group_id: Uuid,
        options: &SchedulingOptions,
    ) -> Result<Vec<SuggestedTimeSlot>> {
        let Some(ctx) = self.load_context(group_id).await? else {
            return Ok(vec![]);
        };

        let count = options
            .sessions_per_week
            .unwrap_or_else(|| ctx.normalized_schedule().sessions_per_week) as usize;

        let ranked = self.weekly_ranking(&ctx, options);
        let pool = selection_pool(&ranked, count);
        let selected = select_diverse_slots(&pool, count);

        info!(
            "Suggested {}/{} weekly slots for group {}",
            selected.len(),
            count,
            ctx.group.name
        );
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::repository::InMemoryStore;
    use crate::services::scheduling::test_support::*;
    use crate::types::ScheduleConflict;
    use chrono::NaiveTime;

    fn ranked_slot(day: WeekDay, start: NaiveTime, score: i32) -> SuggestedTimeSlot {
        SuggestedTimeSlot {
            day,
            start_time: start,
            end_time: crate::services::scheduling::time::add_minutes(start, 30),
            score,
            conflicts: Vec::new(),
        }
    }

    #[test]
    fn test_greedy_covers_every_day_before_repeating() {
        // 5 clean slots over 3 days; the best two are both Monday
        let ranked = vec![
            ranked_slot(WeekDay::Monday, hm(8, 0), 0),
            ranked_slot(WeekDay::Monday, hm(8, 15), 0),
            ranked_slot(WeekDay::Tuesday, hm(11, 0), 1),
            ranked_slot(WeekDay::Tuesday, hm(11, 15), 1),
            ranked_slot(WeekDay::Wednesday, hm(14, 0), 2),
        ];

        let selected = select_diverse_slots(&ranked, 3);
        let days: Vec<WeekDay> = selected.iter().map(|s| s.day).collect();
        assert_eq!(days, vec![WeekDay::Monday, WeekDay::Tuesday, WeekDay::Wednesday]);
    }

    #[test]
    fn test_greedy_second_pass_repeats_days_in_score_order() {
        let ranked = vec![
            ranked_slot(WeekDay::Monday, hm(8, 0), 0),
            ranked_slot(WeekDay::Monday, hm(8, 15), 0),
            ranked_slot(WeekDay::Tuesday, hm(11, 0), 1),
        ];

        let selected = select_diverse_slots(&ranked, 3);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[2].day, WeekDay::Monday);
        assert_eq!(selected[2].start_time, hm(8, 15));
    }

    #[test]
    fn test_greedy_returns_fewer_when_pool_is_small() {
        let ranked = vec![ranked_slot(WeekDay::Monday, hm(8, 0), 0)];
        assert_eq!(select_diverse_slots(&ranked, 3).len(), 1);
        assert!(select_diverse_slots(&[], 2).is_empty());
    }

    #[test]
    fn test_selection_pool_relaxes_to_one_conflict() {
        let conflict = ScheduleConflict::InterventionistUnavailable {
            description: "busy".to_string(),
        };
        let mut one_conflict = ranked_slot(WeekDay::Tuesday, hm(9, 0), 10);
        one_conflict.conflicts = vec![conflict.clone()];
        let mut two_conflicts = ranked_slot(WeekDay::Wednesday, hm(9, 0), 20);
        two_conflicts.conflicts = vec![conflict.clone(), conflict];

        let ranked = vec![
            ranked_slot(WeekDay::Monday, hm(9, 0), 0),
            one_conflict,
            two_conflicts,
        ];

        assert_eq!(selection_pool(&ranked, 1).len(), 1);

        let relaxed = selection_pool(&ranked, 2);
        assert_eq!(relaxed.len(), 2);
        assert!(relaxed.iter().all(|s| s.score < 20));
    }

    #[tokio::test]
    async fn test_find_available_slots_caps_and_sorts() {
        let g = group("3", None);
        let group_id = g.id;
        let mut store = InMemoryStore::new();
        store.groups.push(g);
        let e = engine(store);

        let slots = e
            .find_available_slots(group_id, &SchedulingOptions::default())
            .await
            .unwrap();

        assert_eq!(slots.len(), MAX_WEEKLY_SUGGESTIONS);
        for pair in slots.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
        // Mornings win and ties keep day order
        assert_eq!(slots[0].day, WeekDay::Monday);
        assert_eq!(slots[0].start_time, hm(8, 0));
        assert_eq!(slots[0].score, 0);
    }

    #[tokio::test]
    async fn test_unknown_group_yields_no_weekly_slots() {
        let e = engine(InMemoryStore::new());
        let missing = uuid::Uuid::new_v4();
        let options = SchedulingOptions::default();

        assert!(e.find_available_slots(missing, &options).await.unwrap().is_empty());
        assert!(e.suggest_schedule(missing, &options).await.unwrap().is_empty());
        assert!(e.suggest_optimal_times(missing, &options).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_schedule_avoids_conflicts_and_diversifies() {
        let person = interventionist(vec![
            weekly(&[WeekDay::Monday, WeekDay::Wednesday], hm(8, 0), hm(12, 0)),
            weekly(&[WeekDay::Friday], hm(13, 0), hm(15, 0)),
        ]);
        let g = group("2", Some(person.id));
        let group_id = g.id;
        let ana = student(g.id, "Ana");

        let mut store = InMemoryStore::new();
        store.grade_constraints.push(grade_constraint(
            "2",
            weekly(&WeekDay::ALL, hm(8, 0), hm(9, 0)),
        ));
        store.sessions.push(session(uuid::Uuid::new_v4(), d(2025, 9, 8), hm(9, 0)));
        store.students.push(ana);
        store.interventionists.push(person);
        store.groups.push(g);
        let e = engine(store);

        let options = SchedulingOptions {
            sessions_per_week: Some(3),
            preferred_days: Some(vec![WeekDay::Monday, WeekDay::Wednesday, WeekDay::Friday]),
            ..SchedulingOptions::default()
        };
        let selected = e.suggest_schedule(group_id, &options).await.unwrap();

        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|s| s.conflicts.is_empty()));
        let days: HashSet<WeekDay> = selected.iter().map(|s| s.day).collect();
        assert_eq!(days.len(), 3);

        let monday = selected.iter().find(|s| s.day == WeekDay::Monday).unwrap();
        // 08:00-09:00 is the grade blackout and 09:00 is booked
        assert_eq!(monday.start_time, hm(9, 30));
    }

    #[tokio::test]
    async fn test_suggest_schedule_defaults_to_group_session_count() {
        let mut g = group("K", None);
        g.schedule = crate::types::GroupSchedule::Basic {
            sessions_per_week: 2,
            days: vec![WeekDay::Tuesday, WeekDay::Thursday],
            time: None,
        };
        let group_id = g.id;
        let mut store = InMemoryStore::new();
        store.groups.push(g);
        let e = engine(store);

        let selected = e
            .suggest_schedule(group_id, &SchedulingOptions::default())
            .await
            .unwrap();
        let days: Vec<WeekDay> = selected.iter().map(|s| s.day).collect();
        assert_eq!(days, vec![WeekDay::Tuesday, WeekDay::Thursday]);
    }
}
