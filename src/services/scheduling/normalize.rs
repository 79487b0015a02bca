//! Collapses the authored schedule shapes into one weekday -> time view.

use std::collections::BTreeMap;

use chrono::NaiveTime;

use crate::types::{GroupSchedule, WeekDay};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedSchedule {
    pub day_times: BTreeMap<WeekDay, Option<NaiveTime>>,
    pub sessions_per_week: u32,
}

impl NormalizedSchedule {
    /// Meeting days in Monday..Friday order.
    pub fn days(&self) -> Vec<WeekDay> {
        self.day_times.keys().copied().collect()
    }

    pub fn time_for(&self, day: WeekDay) -> Option<NaiveTime> {
        self.day_times.get(&day).copied().flatten()
    }
}

pub fn normalize_schedule(schedule: &GroupSchedule) -> NormalizedSchedule {
    match schedule {
        GroupSchedule::Basic {
            sessions_per_week,
            days,
            time,
        } => NormalizedSchedule {
            day_times: days.iter().map(|d| (*d, *time)).collect(),
            sessions_per_week: *sessions_per_week,
        },
        GroupSchedule::DayTimes { day_times } => {
            let mut map = BTreeMap::new();
            for entry in day_times {
                // A day listed twice keeps its first explicit time
                let slot = map.entry(entry.day).or_insert(None);
                if slot.is_none() {
                    *slot = entry.time;
                }
            }
            NormalizedSchedule {
                day_times: map,
                sessions_per_week: day_times.len() as u32,
            }
        }
        GroupSchedule::Flexible {
            sessions_per_week,
            preferred_days,
        } => NormalizedSchedule {
            day_times: preferred_days.iter().map(|d| (*d, None)).collect(),
            sessions_per_week: *sessions_per_week,
        },
    }
}
