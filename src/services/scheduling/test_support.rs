//! Builders shared by the scheduling tests

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::context::SchedulingContext;
use super::engine::{EngineSettings, SchedulingEngine};
use crate::services::repository::InMemoryStore;
use crate::types::{
    GradeConstraint, Group, GroupSchedule, InstructionalCycle, Interventionist, Session, SessionStatus,
    Student, StudentConstraint, WeekDay, WeeklyTimeBlock,
};

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn weekly(days: &[WeekDay], start: NaiveTime, end: NaiveTime) -> WeeklyTimeBlock {
    WeeklyTimeBlock {
        days: days.to_vec(),
        start_time: start,
        end_time: end,
    }
}

pub fn group(grade: &str, interventionist_id: Option<Uuid>) -> Group {
    Group {
        id: Uuid::new_v4(),
        name: format!("Grade {} reading", grade),
        grade_level: grade.to_string(),
        interventionist_id,
        schedule: GroupSchedule::Flexible {
            sessions_per_week: 3,
            preferred_days: Vec::new(),
        },
    }
}

pub fn student(group_id: Uuid, first: &str) -> Student {
    Student {
        id: Uuid::new_v4(),
        group_id,
        first_name: first.to_string(),
        last_name: "Lee".to_string(),
    }
}

pub fn interventionist(availability: Vec<WeeklyTimeBlock>) -> Interventionist {
    Interventionist {
        id: Uuid::new_v4(),
        name: "Ms. Rivera".to_string(),
        availability,
    }
}

pub fn grade_constraint(grade: &str, window: WeeklyTimeBlock) -> GradeConstraint {
    GradeConstraint {
        id: Uuid::new_v4(),
        grade_level: grade.to_string(),
        label: "Specials".to_string(),
        window,
    }
}

pub fn student_constraint(student_id: Uuid, window: WeeklyTimeBlock) -> StudentConstraint {
    StudentConstraint {
        id: Uuid::new_v4(),
        student_id,
        reason: "Speech".to_string(),
        window,
    }
}

pub fn session(group_id: Uuid, date: NaiveDate, time: NaiveTime) -> Session {
    Session {
        id: Uuid::new_v4(),
        group_id,
        date,
        time: Some(time),
        end_time: None,
        status: SessionStatus::Planned,
    }
}

pub fn cycle(start: NaiveDate, end: NaiveDate) -> InstructionalCycle {
    InstructionalCycle {
        id: Uuid::new_v4(),
        name: "Fall cycle".to_string(),
        start_date: start,
        end_date: end,
        is_current: true,
    }
}

/// Context with no roster, interventionist, constraints or bookings
pub fn context(group: Group) -> SchedulingContext {
    SchedulingContext {
        group,
        roster: Vec::new(),
        interventionist: None,
        grade_constraints: Vec::new(),
        student_constraints: Vec::new(),
        existing_sessions: Vec::new(),
    }
}

pub fn engine(store: InMemoryStore) -> SchedulingEngine {
    let store = Arc::new(store);
    SchedulingEngine::new(store.clone(), store.clone(), store, EngineSettings::default())
}
