//! Interventionist availability: membership checks and blocked-time inversion.
//!
//! The blocked-time inversion works per day: a day without any stated block
//! has nothing blocked. Slot membership is stricter: once any block exists,
//! a slot must fit inside one of that day's blocks.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, warn};
use uuid::Uuid;

use super::engine::SchedulingEngine;
use crate::defaults::{canonical_day_end, canonical_day_start};
use crate::types::{Interventionist, TimeBlock, WeekDay, WeeklyTimeBlock};

/// Available windows on `day`, sorted by start time.
pub fn available_blocks_for_day(availability: &[WeeklyTimeBlock], day: WeekDay) -> Vec<TimeBlock> {
    let mut blocks: Vec<TimeBlock> = availability
        .iter()
        .filter(|b| b.applies_on(day))
        .map(WeeklyTimeBlock::block)
        .collect();
    blocks.sort_by_key(|b| b.start_time);
    blocks
}

/// Complement of the stated availability within the canonical 07:00-17:00
/// day. Empty when `day` has no availability blocks.
pub fn blocked_times_for_day(availability: &[WeeklyTimeBlock], day: WeekDay) -> Vec<TimeBlock> {
    let available = available_blocks_for_day(availability, day);
    if available.is_empty() {
        return vec![];
    }

    let day_start = canonical_day_start();
    let day_end = canonical_day_end();

    let mut blocked = Vec::new();
    let mut cursor = day_start;

    for block in available {
        let gap_end = block.start_time.min(day_end);
        if gap_end > cursor {
            blocked.push(TimeBlock::new(cursor, gap_end));
        }
        if block.end_time > cursor {
            cursor = block.end_time;
        }
        if cursor >= day_end {
            break;
        }
    }

    if cursor < day_end {
        blocked.push(TimeBlock::new(cursor, day_end));
    }

    blocked
}

/// A slot is available when it lies entirely inside one stated block for
/// that day, or when the interventionist has no blocks defined.
pub fn is_interventionist_available(interventionist: &Interventionist, day: WeekDay, slot: &TimeBlock) -> bool {
    if interventionist.availability.is_empty() {
        return true;
    }

    interventionist
        .availability
        .iter()
        .filter(|b| b.applies_on(day))
        .any(|b| b.block().contains(slot))
}

impl SchedulingEngine {
    /// Blocked windows for every school day of an interventionist's week.
    /// Unknown interventionists yield an empty map.
    pub async fn get_interventionist_blocked_times(
        &self,
        interventionist_id: Uuid,
    ) -> Result<BTreeMap<WeekDay, Vec<TimeBlock>>> {
        let Some(person) = self
            .group_repository()
            .get_interventionist(interventionist_id)
            .await?
        else {
            warn!("Interventionist {} not found", interventionist_id);
            return Ok(BTreeMap::new());
        };

        let blocked: BTreeMap<WeekDay, Vec<TimeBlock>> = WeekDay::ALL
            .iter()
            .map(|day| (*day, blocked_times_for_day(&person.availability, *day)))
            .collect();
        debug!(
            "Resolved blocked times for {} from {} availability blocks",
            person.name,
            person.availability.len()
        );
        Ok(blocked)
    }
}
