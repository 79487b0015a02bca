//! Group, roster, interventionist and constraint types

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::clock::hhmm_option;
use crate::types::schedule::{WeekDay, WeeklyTimeBlock};

/// Instructional group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub grade_level: String,
    #[serde(default)]
    pub interventionist_id: Option<Uuid>,
    #[serde(default)]
    pub schedule: GroupSchedule,
}

/// The shapes a group's schedule is authored in. The engine only ever sees
/// the normalized form (`services::scheduling::normalize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GroupSchedule {
    /// N sessions per week on a fixed set of days, optionally at one time
    #[serde(rename_all = "camelCase")]
    Basic {
        sessions_per_week: u32,
        #[serde(default)]
        days: Vec<WeekDay>,
        #[serde(default, with = "hhmm_option")]
        time: Option<NaiveTime>,
    },
    /// Each meeting day carries its own (optional) time
    #[serde(rename_all = "camelCase")]
    DayTimes { day_times: Vec<DayTime> },
    /// A count with loose day preferences
    #[serde(rename_all = "camelCase")]
    Flexible {
        sessions_per_week: u32,
        #[serde(default)]
        preferred_days: Vec<WeekDay>,
    },
}

impl Default for GroupSchedule {
    fn default() -> Self {
        GroupSchedule::Flexible {
            sessions_per_week: 1,
            preferred_days: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTime {
    pub day: WeekDay,
    #[serde(default, with = "hhmm_option")]
    pub time: Option<NaiveTime>,
}

/// Roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub group_id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Interventionist with the windows they are available in.
/// An empty `availability` list means available at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interventionist {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub availability: Vec<WeeklyTimeBlock>,
}

/// Blackout applying to every student of a grade level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeConstraint {
    pub id: Uuid,
    pub grade_level: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub window: WeeklyTimeBlock,
}

/// Blackout applying to one student
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentConstraint {
    pub id: Uuid,
    pub student_id: Uuid,
    #[serde(default)]
    pub reason: String,
    #[serde(flatten)]
    pub window: WeeklyTimeBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_schedule_shapes_deserialize() {
        let basic: GroupSchedule = serde_json::from_str(
            r#"{"type":"basic","sessionsPerWeek":3,"days":["monday","wednesday"],"time":"09:00"}"#,
        )
        .unwrap();
        assert!(matches!(basic, GroupSchedule::Basic { sessions_per_week: 3, .. }));

        let day_times: GroupSchedule = serde_json::from_str(
            r#"{"type":"day_times","dayTimes":[{"day":"tuesday","time":"10:30"},{"day":"thursday"}]}"#,
        )
        .unwrap();
        match day_times {
            GroupSchedule::DayTimes { day_times } => {
                assert_eq!(day_times.len(), 2);
                assert!(day_times[1].time.is_none());
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_group_without_schedule_gets_default() {
        let group: Group = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Reading A","gradeLevel":"2"}"#,
        )
        .unwrap();
        assert_eq!(group.schedule, GroupSchedule::default());
        assert!(group.interventionist_id.is_none());
    }

    #[test]
    fn test_constraint_window_is_flattened() {
        let constraint: StudentConstraint = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000002","studentId":"00000000-0000-0000-0000-000000000003","reason":"OT","days":["friday"],"startTime":"10:00","endTime":"10:45"}"#,
        )
        .unwrap();
        assert_eq!(constraint.window.days, vec![WeekDay::Friday]);
        assert_eq!(constraint.window.block().duration_minutes(), 45);
    }
}
