//! Scheduling types: weekdays, time blocks, conflicts and engine results

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::DEFAULT_SESSION_DURATION_MINUTES;
use crate::types::clock::{hhmm, hhmm_option};

/// Instructional weekday. Weekends never appear here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 5] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];

    /// Weekday of a calendar date, `None` for Saturday and Sunday.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        Self::from_chrono(date.weekday())
    }

    pub fn from_chrono(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Mon => Some(WeekDay::Monday),
            Weekday::Tue => Some(WeekDay::Tuesday),
            Weekday::Wed => Some(WeekDay::Wednesday),
            Weekday::Thu => Some(WeekDay::Thursday),
            Weekday::Fri => Some(WeekDay::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
        }
    }

    /// Parse the lowercase day name used in storage. Unknown names (and
    /// weekend names) yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "monday" => Some(WeekDay::Monday),
            "tuesday" => Some(WeekDay::Tuesday),
            "wednesday" => Some(WeekDay::Wednesday),
            "thursday" => Some(WeekDay::Thursday),
            "friday" => Some(WeekDay::Friday),
            _ => None,
        }
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One contiguous wall-clock interval on a single day, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl TimeBlock {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self { start_time, end_time }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether `other` lies completely inside this block.
    pub fn contains(&self, other: &TimeBlock) -> bool {
        self.start_time <= other.start_time && other.end_time <= self.end_time
    }
}

/// A time block recurring on a set of weekdays (availability windows,
/// grade-level and per-student blackouts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTimeBlock {
    pub days: Vec<WeekDay>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl WeeklyTimeBlock {
    pub fn applies_on(&self, day: WeekDay) -> bool {
        self.days.contains(&day)
    }

    pub fn block(&self) -> TimeBlock {
        TimeBlock::new(self.start_time, self.end_time)
    }
}

/// Why a candidate slot is problematic, or why a request produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleConflict {
    InterventionistUnavailable {
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    StudentUnavailable {
        description: String,
        student_id: Uuid,
        student_name: String,
    },
    #[serde(rename_all = "camelCase")]
    ExistingSession {
        description: String,
        session_id: Uuid,
    },
    GroupNotFound {
        description: String,
    },
    NoCycle {
        description: String,
    },
}

impl ScheduleConflict {
    pub fn description(&self) -> &str {
        match self {
            ScheduleConflict::InterventionistUnavailable { description }
            | ScheduleConflict::StudentUnavailable { description, .. }
            | ScheduleConflict::ExistingSession { description, .. }
            | ScheduleConflict::GroupNotFound { description }
            | ScheduleConflict::NoCycle { description } => description,
        }
    }
}

/// A ranked, date-less weekly slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedTimeSlot {
    pub day: WeekDay,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub score: i32,
    pub conflicts: Vec<ScheduleConflict>,
}

impl SuggestedTimeSlot {
    pub fn block(&self) -> TimeBlock {
        TimeBlock::new(self.start_time, self.end_time)
    }
}

/// A calendar-dated assignment produced by cycle scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub date: NaiveDate,
    pub day: WeekDay,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub conflicts: Vec<ScheduleConflict>,
}

impl ScheduledSession {
    pub fn block(&self) -> TimeBlock {
        TimeBlock::new(self.time, self.end_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleScheduleResult {
    pub dates: Vec<ScheduledSession>,
    pub total_sessions: usize,
    pub skipped_dates: Vec<NaiveDate>,
    pub conflicts: Vec<ScheduleConflict>,
}

impl CycleScheduleResult {
    /// Empty result carrying a single terminal conflict.
    pub fn failed(conflict: ScheduleConflict) -> Self {
        Self {
            conflicts: vec![conflict],
            ..Self::default()
        }
    }
}

fn default_session_duration() -> u32 {
    DEFAULT_SESSION_DURATION_MINUTES
}

/// Options for the weekly finder, `suggestSchedule` and `suggestOptimalTimes`.
///
/// `start_hour`/`end_hour` fall back to the engine settings when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOptions {
    #[serde(default = "default_session_duration")]
    pub session_duration: u32,
    #[serde(default)]
    pub sessions_per_week: Option<u32>,
    #[serde(default)]
    pub preferred_days: Option<Vec<WeekDay>>,
    #[serde(default)]
    pub start_hour: Option<u32>,
    #[serde(default)]
    pub end_hour: Option<u32>,
}

impl Default for SchedulingOptions {
    fn default() -> Self {
        Self {
            session_duration: DEFAULT_SESSION_DURATION_MINUTES,
            sessions_per_week: None,
            preferred_days: None,
            start_hour: None,
            end_hour: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleSchedulingOptions {
    #[serde(default)]
    pub cycle_id: Option<Uuid>,
    #[serde(default = "default_session_duration")]
    pub session_duration: u32,
    #[serde(default)]
    pub preferred_days: Vec<WeekDay>,
    #[serde(default, with = "hhmm_option")]
    pub preferred_time: Option<NaiveTime>,
    #[serde(default)]
    pub start_hour: Option<u32>,
    #[serde(default)]
    pub end_hour: Option<u32>,
}

impl Default for CycleSchedulingOptions {
    fn default() -> Self {
        Self {
            cycle_id: None,
            session_duration: DEFAULT_SESSION_DURATION_MINUTES,
            preferred_days: Vec::new(),
            preferred_time: None,
            start_hour: None,
            end_hour: None,
        }
    }
}

/// Options for the cross-group batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSchedulingOptions {
    #[serde(flatten)]
    pub cycle: CycleSchedulingOptions,
    #[serde(default)]
    pub balance_workload: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterventionistWorkload {
    pub total_sessions: usize,
    pub sessions_by_day: BTreeMap<WeekDay, u32>,
    /// Keyed by hour of day (0-23).
    pub sessions_by_hour: BTreeMap<u32, u32>,
    pub average_per_day: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_date_excludes_weekend() {
        // 2025-09-06 is a Saturday
        let saturday = NaiveDate::from_ymd_opt(2025, 9, 6).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 9, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();

        assert_eq!(WeekDay::from_date(saturday), None);
        assert_eq!(WeekDay::from_date(sunday), None);
        assert_eq!(WeekDay::from_date(monday), Some(WeekDay::Monday));
    }

    #[test]
    fn test_weekday_parse_rejects_weekend_names() {
        assert_eq!(WeekDay::parse("Friday"), Some(WeekDay::Friday));
        assert_eq!(WeekDay::parse("saturday"), None);
    }

    #[test]
    fn test_conflict_serializes_with_snake_case_tag() {
        let conflict = ScheduleConflict::StudentUnavailable {
            description: "Ava has speech therapy".to_string(),
            student_id: Uuid::nil(),
            student_name: "Ava".to_string(),
        };
        let json = serde_json::to_value(&conflict).unwrap();
        assert_eq!(json["type"], "student_unavailable");
        assert_eq!(json["studentName"], "Ava");
    }

    #[test]
    fn test_cycle_options_defaults() {
        let opts: CycleSchedulingOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.session_duration, 30);
        assert!(opts.preferred_days.is_empty());
        assert!(opts.preferred_time.is_none());
    }

    #[test]
    fn test_batch_options_flatten_cycle_fields() {
        let opts: BatchSchedulingOptions = serde_json::from_str(
            r#"{"sessionDuration":45,"preferredDays":["monday"],"preferredTime":"09:00","balanceWorkload":true}"#,
        )
        .unwrap();
        assert_eq!(opts.cycle.session_duration, 45);
        assert_eq!(opts.cycle.preferred_days, vec![WeekDay::Monday]);
        assert!(opts.balance_workload);
    }

    #[test]
    fn test_block_contains() {
        let outer = TimeBlock::new(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let inner = TimeBlock::new(
            NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(inner.duration_minutes(), 30);
    }
}
