//! Per-student blocked time for one weekday.
//!
//! Blocks are not merged or deduplicated; consumers only ask whether any
//! block overlaps a candidate slot.

use std::collections::HashMap;

use uuid::Uuid;

use crate::types::{GradeConstraint, Student, StudentConstraint, TimeBlock, WeekDay};

/// Student id -> grade-level blocks for `grade_level` plus the student's own
/// blocks, for `day`. Every roster student gets an entry.
pub fn student_blocked_times(
    day: WeekDay,
    grade_level: &str,
    roster: &[Student],
    grade_constraints: &[GradeConstraint],
    student_constraints: &[StudentConstraint],
) -> HashMap<Uuid, Vec<TimeBlock>> {
    let grade_blocks: Vec<TimeBlock> = grade_constraints
        .iter()
        .filter(|c| c.grade_level == grade_level && c.window.applies_on(day))
        .map(|c| c.window.block())
        .collect();

    roster
        .iter()
        .map(|student| {
            let mut blocks = grade_blocks.clone();
            blocks.extend(
                student_constraints
                    .iter()
                    .filter(|c| c.student_id == student.id && c.window.applies_on(day))
                    .map(|c| c.window.block()),
            );
            (student.id, blocks)
        })
        .collect()
}
