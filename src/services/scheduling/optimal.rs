//! System-wide load-spreading variant of the weekly finder.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Timelike;
use tracing::debug;
use uuid::Uuid;

use super::context::SchedulingContext;
use super::engine::{resolve_days, SchedulingEngine};
use super::weekly::rank_weekly_slots;
use crate::defaults::MAX_OPTIMAL_SUGGESTIONS;
use crate::types::{SchedulingOptions, Session, SuggestedTimeSlot, TimeBlock, WeekDay};

/// Keeps popularity below a single conflict's penalty.
pub const MAX_POPULARITY_PENALTY: i32 = 9;

/// Booked session counts per weekday and start hour.
#[derive(Debug, Default)]
pub struct PopularityIndex {
    counts: HashMap<(WeekDay, u32), i32>,
}

impl PopularityIndex {
    pub fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Self {
        let mut counts = HashMap::new();
        for session in sessions.into_iter().filter(|s| s.is_active()) {
            let (Some(day), Some(time)) = (WeekDay::from_date(session.date), session.time) else {
                continue;
            };
            *counts.entry((day, time.hour())).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn penalty(&self, slot: &SuggestedTimeSlot) -> i32 {
        self.counts
            .get(&(slot.day, slot.start_time.hour()))
            .copied()
            .unwrap_or(0)
            .min(MAX_POPULARITY_PENALTY)
    }
}

pub fn rank_optimal_slots(
    ctx: &SchedulingContext,
    days: &[WeekDay],
    candidates: &[TimeBlock],
) -> Vec<SuggestedTimeSlot> {
    let popularity = PopularityIndex::from_sessions(&ctx.existing_sessions);

    let mut ranked = rank_weekly_slots(ctx, days, candidates);
    for slot in &mut ranked {
        slot.score += popularity.penalty(slot);
    }
    ranked.sort_by_key(|s| s.score);
    ranked.truncate(MAX_OPTIMAL_SUGGESTIONS);
    ranked
}

impl SchedulingEngine {
    /// Weekly ranking that also steers away from hours already crowded
    /// across every group in the system.
    pub async fn suggest_optimal_times(
        &self,
        group_id: Uuid,
        options: &SchedulingOptions,
    ) -> Result<Vec<SuggestedTimeSlot>> {
        let Some(ctx) = self.load_context(group_id).await? else {
            return Ok(vec![]);
        };

        let requested = options.preferred_days.clone().unwrap_or_default();
        let days = resolve_days(&requested, &ctx.normalized_schedule().days());
        let candidates = self.candidate_slots(options.session_duration, options.start_hour, options.end_hour);

        let ranked = rank_optimal_slots(&ctx, &days, &candidates);
        debug!("Ranked {} optimal slots for group {}", ranked.len(), ctx.group.name);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::repository::InMemoryStore;
    use crate::services::scheduling::test_support::*;
    use crate::services::scheduling::time::generate_time_slots;
    use crate::types::SessionStatus;

    #[test]
    fn test_popularity_is_capped_below_one_conflict() {
        let mut ctx = context(group("4", None));
        // Twelve Monday 10:45 bookings from other groups
        ctx.existing_sessions = (0..12)
            .map(|w| session(Uuid::new_v4(), d(2025, 9, 1) + chrono::Duration::weeks(w), hm(10, 45)))
            .collect();
        let popularity = PopularityIndex::from_sessions(&ctx.existing_sessions);

        let probe = SuggestedTimeSlot {
            day: WeekDay::Monday,
            start_time: hm(10, 0),
            end_time: hm(10, 30),
            score: 0,
            conflicts: Vec::new(),
        };
        assert_eq!(popularity.penalty(&probe), MAX_POPULARITY_PENALTY);

        let tuesday = SuggestedTimeSlot {
            day: WeekDay::Tuesday,
            ..probe
        };
        assert_eq!(popularity.penalty(&tuesday), 0);
    }

    #[test]
    fn test_cancelled_sessions_are_not_popular() {
        let mut s = session(Uuid::new_v4(), d(2025, 9, 8), hm(9, 0));
        s.status = SessionStatus::Cancelled;
        let popularity = PopularityIndex::from_sessions(&[s]);
        let probe = SuggestedTimeSlot {
            day: WeekDay::Monday,
            start_time: hm(9, 30),
            end_time: hm(10, 0),
            score: 0,
            conflicts: Vec::new(),
        };
        assert_eq!(popularity.penalty(&probe), 0);
    }

    #[test]
    fn test_crowded_hour_drops_in_ranking() {
        let mut ctx = context(group("4", None));
        // Three bookings at 08:00 on Mondays
        ctx.existing_sessions = (0..3)
            .map(|w| session(Uuid::new_v4(), d(2025, 9, 1) + chrono::Duration::weeks(w), hm(8, 0)))
            .collect();
        let candidates = generate_time_slots(30, 8, 11, 15);

        let ranked = rank_optimal_slots(&ctx, &[WeekDay::Monday], &candidates);

        // 09:00 onward is clean and uncrowded
        assert_eq!(ranked[0].start_time, hm(9, 0));
        assert_eq!(ranked[0].score, 0);
        // 08:45 only sits in the crowded hour
        let quarter_to = ranked.iter().find(|s| s.start_time == hm(8, 45)).unwrap();
        assert_eq!(quarter_to.score, 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_suggest_optimal_times_caps_at_thirty() {
        let g = group("4", None);
        let group_id = g.id;
        let mut store = InMemoryStore::new();
        store.groups.push(g);
        let e = engine(store);

        let ranked = e
            .suggest_optimal_times(group_id, &SchedulingOptions::default())
            .await
            .unwrap();
        assert_eq!(ranked.len(), MAX_OPTIMAL_SUGGESTIONS);

        let none = e
            .suggest_optimal_times(Uuid::new_v4(), &SchedulingOptions::default())
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
