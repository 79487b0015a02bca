//! Conflict detection and desirability scoring for one candidate slot.
//!
//! Lower scores are better. Every conflict adds [`CONFLICT_PENALTY`];
//! preference bonuses are subtracted afterwards.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use uuid::Uuid;

use super::availability::is_interventionist_available;
use super::context::SchedulingContext;
use super::time::{do_times_overlap, format_hhmm};
use crate::defaults::DEFAULT_SESSION_DURATION_MINUTES;
use crate::types::{ScheduleConflict, Session, TimeBlock, WeekDay};

pub const CONFLICT_PENALTY: i32 = 10;
pub const PREFERRED_TIME_BONUS: i32 = 5;
pub const CONSISTENCY_BONUS: i32 = 3;

/// Time-of-day preference: mornings best, late afternoon and very early worst.
pub fn base_time_score(start: NaiveTime) -> i32 {
    match start.hour() {
        8..=10 => 0,
        11..=13 => 1,
        14 => 2,
        _ => 3,
    }
}

/// Context-specific soft preferences applied after the conflict penalty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAdjustments {
    /// Explicitly requested start time
    pub preferred_time: Option<NaiveTime>,
    /// Start time chosen for the previous date in the same cycle run
    pub previous_time: Option<NaiveTime>,
}

pub fn final_score(slot: &TimeBlock, conflict_count: usize, adjustments: &ScoreAdjustments) -> i32 {
    let mut score = base_time_score(slot.start_time) + CONFLICT_PENALTY * conflict_count as i32;
    if adjustments.preferred_time == Some(slot.start_time) {
        score -= PREFERRED_TIME_BONUS;
    }
    if adjustments.previous_time == Some(slot.start_time) {
        score -= CONSISTENCY_BONUS;
    }
    score
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotEvaluation {
    pub score: i32,
    pub conflicts: Vec<ScheduleConflict>,
}

/// Scores candidate slots for one weekday (weekly view) or one calendar
/// date (cycle view). Student blocks and bookings are resolved once.
pub struct SlotScorer<'a> {
    ctx: &'a SchedulingContext,
    day: WeekDay,
    student_blocks: HashMap<Uuid, Vec<TimeBlock>>,
    booked: Vec<(Uuid, TimeBlock)>,
    place: String,
}

impl<'a> SlotScorer<'a> {
    /// Weekly view: bookings on any date that falls on `day`.
    pub fn for_weekday(ctx: &'a SchedulingContext, day: WeekDay) -> Self {
        let booked = booked_windows(ctx.sessions_on_weekday(day));
        Self {
            ctx,
            day,
            student_blocks: ctx.student_blocks(day),
            booked,
            place: day.to_string(),
        }
    }

    /// Cycle view: bookings on exactly `date`. `None` for weekend dates.
    pub fn for_date(ctx: &'a SchedulingContext, date: NaiveDate) -> Option<Self> {
        let day = WeekDay::from_date(date)?;
        let booked = booked_windows(ctx.sessions_on_date(date));
        Some(Self {
            ctx,
            day,
            student_blocks: ctx.student_blocks(day),
            booked,
            place: date.to_string(),
        })
    }

    pub fn day(&self) -> WeekDay {
        self.day
    }

    pub fn conflicts(&self, slot: &TimeBlock) -> Vec<ScheduleConflict> {
        let mut conflicts = Vec::new();
        let window = format!(
            "{} {}-{}",
            self.place,
            format_hhmm(slot.start_time),
            format_hhmm(slot.end_time)
        );

        if let Some(person) = &self.ctx.interventionist {
            if !is_interventionist_available(person, self.day, slot) {
                conflicts.push(ScheduleConflict::InterventionistUnavailable {
                    description: format!("{} is not available {}", person.name, window),
                });
            }
        }

        for student in &self.ctx.roster {
            let blocked = self
                .student_blocks
                .get(&student.id)
                .map(|blocks| blocks.iter().any(|b| do_times_overlap(b, slot)))
                .unwrap_or(false);
            if blocked {
                conflicts.push(ScheduleConflict::StudentUnavailable {
                    description: format!("{} is unavailable {}", student.full_name(), window),
                    student_id: student.id,
                    student_name: student.full_name(),
                });
            }
        }

        if let Some((session_id, booked)) = self.booked.iter().find(|(_, b)| do_times_overlap(b, slot)) {
            conflicts.push(ScheduleConflict::ExistingSession {
                description: format!(
                    "Overlaps a session booked {} {}-{}",
                    self.place,
                    format_hhmm(booked.start_time),
                    format_hhmm(booked.end_time)
                ),
                session_id: *session_id,
            });
        }

        conflicts
    }

    pub fn evaluate(&self, slot: &TimeBlock, adjustments: &ScoreAdjustments) -> SlotEvaluation {
        let conflicts = self.conflicts(slot);
        SlotEvaluation {
            score: final_score(slot, conflicts.len(), adjustments),
            conflicts,
        }
    }
}

fn booked_windows(sessions: Vec<&Session>) -> Vec<(Uuid, TimeBlock)> {
    sessions
        .into_iter()
        .filter_map(|s| s.window(DEFAULT_SESSION_DURATION_MINUTES).map(|w| (s.id, w)))
        .collect()
}
