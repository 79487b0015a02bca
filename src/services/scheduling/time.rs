//! Wall-clock arithmetic and candidate slot generation.
//!
//! All values stay inside a single calendar day; nothing here wraps past
//! midnight.

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

use crate::types::TimeBlock;

const LAST_MINUTE_OF_DAY: u32 = 24 * 60 - 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("malformed time '{0}', expected HH:MM")]
    Malformed(String),
}

/// Parse `"HH:MM"` (a trailing `":SS"` is tolerated).
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, TimeParseError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| TimeParseError::Malformed(raw.to_string()))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn time_to_minutes(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Inverse of [`time_to_minutes`]. Values past 23:59 clamp to 23:59.
pub fn minutes_to_time(minutes: u32) -> NaiveTime {
    let m = minutes.min(LAST_MINUTE_OF_DAY);
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or_default()
}

pub fn add_minutes(time: NaiveTime, minutes: i64) -> NaiveTime {
    let total = time_to_minutes(time) as i64 + minutes;
    minutes_to_time(total.clamp(0, LAST_MINUTE_OF_DAY as i64) as u32)
}

/// Half-open overlap: back-to-back blocks do not overlap.
pub fn do_times_overlap(a: &TimeBlock, b: &TimeBlock) -> bool {
    a.start_time < b.end_time && b.start_time < a.end_time
}

/// Every `duration`-minute slot starting on `interval` steps from
/// `start_hour:00` whose end does not pass `end_hour:00`, ascending by start.
/// Hours past the end of the day clamp to 23:59.
pub fn generate_time_slots(duration: u32, start_hour: u32, end_hour: u32, interval: u32) -> Vec<TimeBlock> {
    if duration == 0 || interval == 0 {
        return vec![];
    }

    let day_start = start_hour.saturating_mul(60).min(LAST_MINUTE_OF_DAY);
    let day_end = end_hour.saturating_mul(60).min(LAST_MINUTE_OF_DAY);

    let mut slots = Vec::new();
    let mut cursor = day_start;
    while let Some(slot_end) = cursor.checked_add(duration).filter(|end| *end <= day_end) {
        slots.push(TimeBlock::new(minutes_to_time(cursor), minutes_to_time(slot_end)));
        cursor = match cursor.checked_add(interval) {
            Some(next) => next,
            None => break,
        };
    }
    slots
}
