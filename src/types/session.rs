//! Booked session types

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::scheduling::time::add_minutes;
use crate::types::clock::hhmm_option;
use crate::types::schedule::TimeBlock;

/// A dated, booked meeting of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub group_id: Uuid,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm_option")]
    pub time: Option<NaiveTime>,
    #[serde(default, with = "hhmm_option")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: SessionStatus,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status != SessionStatus::Cancelled
    }

    /// Occupied window. Untimed sessions occupy nothing; a missing end time
    /// is inferred as `default_duration` minutes after the start.
    pub fn window(&self, default_duration: u32) -> Option<TimeBlock> {
        let start = self.time?;
        let end = self
            .end_time
            .filter(|end| *end > start)
            .unwrap_or_else(|| add_minutes(start, default_duration as i64));
        Some(TimeBlock::new(start, end))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Planned,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Planned => "planned",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the stored status; unknown values are treated as planned so they
    /// still block the slot.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => SessionStatus::Completed,
            "cancelled" | "canceled" => SessionStatus::Cancelled,
            _ => SessionStatus::Planned,
        }
    }
}
