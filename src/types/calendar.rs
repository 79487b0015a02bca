//! Instructional cycle and school calendar types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bounded instructional period
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InstructionalCycle {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_current: bool,
}

impl InstructionalCycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Calendar entry that removes a date from instruction
/// (holiday, professional development, etc.)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    /// Grade levels affected; empty means the whole school
    #[serde(default)]
    pub grade_levels: Vec<String>,
}

impl CalendarEvent {
    pub fn applies_to(&self, grade_level: Option<&str>) -> bool {
        match grade_level {
            Some(grade) if !self.grade_levels.is_empty() => {
                self.grade_levels.iter().any(|g| g == grade)
            }
            _ => true,
        }
    }
}
