//! Scheduling engine: owns the collaborators and resolves shared inputs.
//!
//! The public operations live next to their algorithms (`weekly`, `cycle`,
//! `balancer`, `workload`, `optimal`).

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use super::context::SchedulingContext;
use super::time::generate_time_slots;
use crate::defaults::{DEFAULT_END_HOUR, DEFAULT_SLOT_INTERVAL_MINUTES, DEFAULT_START_HOUR};
use crate::services::repository::{CalendarService, GroupRepository, SessionRepository};
use crate::types::{InstructionalCycle, TimeBlock, WeekDay};

/// Defaults applied when a request leaves the working window unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub start_hour: u32,
    pub end_hour: u32,
    pub slot_interval_minutes: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
        }
    }
}

pub struct SchedulingEngine {
    groups: Arc<dyn GroupRepository>,
    sessions: Arc<dyn SessionRepository>,
    calendar: Arc<dyn CalendarService>,
    settings: EngineSettings,
}

impl SchedulingEngine {
    pub fn new(
        groups: Arc<dyn GroupRepository>,
        sessions: Arc<dyn SessionRepository>,
        calendar: Arc<dyn CalendarService>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            groups,
            sessions,
            calendar,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) fn group_repository(&self) -> &dyn GroupRepository {
        self.groups.as_ref()
    }

    pub(crate) fn session_repository(&self) -> &dyn SessionRepository {
        self.sessions.as_ref()
    }

    pub(crate) async fn load_context(&self, group_id: Uuid) -> Result<Option<SchedulingContext>> {
        SchedulingContext::load(self.groups.as_ref(), self.sessions.as_ref(), group_id).await
    }

    /// Candidate slots for `duration` minutes within the requested window.
    pub(crate) fn candidate_slots(
        &self,
        duration: u32,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
    ) -> Vec<TimeBlock> {
        generate_time_slots(
            duration,
            start_hour.unwrap_or(self.settings.start_hour),
            end_hour.unwrap_or(self.settings.end_hour),
            self.settings.slot_interval_minutes,
        )
    }

    /// Explicit cycle, or the calendar's current one. Lookup failures are
    /// logged and treated as "no cycle".
    pub(crate) async fn resolve_cycle(&self, cycle_id: Option<Uuid>) -> Option<InstructionalCycle> {
        let lookup = match cycle_id {
            Some(id) => self.calendar.get_cycle(id).await,
            None => self.calendar.current_cycle().await,
        };

        match lookup {
            Ok(Some(cycle)) => {
                debug!(
                    "Resolved cycle {} ({} to {})",
                    cycle.name, cycle.start_date, cycle.end_date
                );
                Some(cycle)
            }
            Ok(None) => {
                warn!("No instructional cycle found (requested: {:?})", cycle_id);
                None
            }
            Err(e) => {
                warn!(
                    "Cycle lookup via {} failed: {}. Treating as no cycle.",
                    self.calendar.name(),
                    e
                );
                None
            }
        }
    }

    /// Non-instructional dates inside the cycle. Lookup failures degrade to
    /// an empty set.
    pub(crate) async fn excluded_dates(
        &self,
        cycle: &InstructionalCycle,
        grade_level: Option<&str>,
    ) -> HashSet<NaiveDate> {
        match self
            .calendar
            .non_instructional_dates(cycle.start_date, cycle.end_date, grade_level)
            .await
        {
            Ok(dates) => dates.into_iter().collect(),
            Err(e) => {
                warn!(
                    "Calendar lookup via {} failed: {}. Treating every date as instructional.",
                    self.calendar.name(),
                    e
                );
                HashSet::new()
            }
        }
    }
}

/// Requested days, else the group's own days, else the whole week.
/// Duplicates are dropped, first occurrence wins.
pub(crate) fn resolve_days(requested: &[WeekDay], fallback: &[WeekDay]) -> Vec<WeekDay> {
    let source: &[WeekDay] = if !requested.is_empty() {
        requested
    } else if !fallback.is_empty() {
        fallback
    } else {
        &WeekDay::ALL
    };

    let mut days = Vec::with_capacity(source.len());
    for day in source {
        if !days.contains(day) {
            days.push(*day);
        }
    }
    days
}
