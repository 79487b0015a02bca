use chrono::NaiveTime;

/// Length assumed for booked sessions stored without an end time.
pub const DEFAULT_SESSION_DURATION_MINUTES: u32 = 30;

pub const DEFAULT_START_HOUR: u32 = 7;
pub const DEFAULT_END_HOUR: u32 = 17;
pub const DEFAULT_SLOT_INTERVAL_MINUTES: u32 = 15;

/// Result caps for the weekly finder and `suggest_optimal_times`.
pub const MAX_WEEKLY_SUGGESTIONS: usize = 20;
pub const MAX_OPTIMAL_SUGGESTIONS: usize = 30;

/// Start of the canonical day used to invert availability into blocked time.
pub fn canonical_day_start() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).expect("valid static canonical day start")
}

/// End of the canonical day used to invert availability into blocked time.
pub fn canonical_day_end() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).expect("valid static canonical day end")
}
