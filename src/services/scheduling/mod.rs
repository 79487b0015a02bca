//! Time-slot scheduling engine
//!
//! Turns a group's constraints into ranked weekly slots, dated cycle
//! schedules and cross-group batches. All I/O goes through the traits in
//! `services::repository`.

pub mod availability;
pub mod balancer;
pub mod constraints;
pub mod context;
pub mod cycle;
pub mod engine;
pub mod normalize;
pub mod optimal;
pub mod scoring;
pub mod time;
pub mod weekly;
pub mod workload;

#[cfg(test)]
mod test_support;

pub use balancer::UsedSlotIndex;
pub use context::SchedulingContext;
pub use engine::{EngineSettings, SchedulingEngine};
pub use normalize::{normalize_schedule, NormalizedSchedule};
pub use time::TimeParseError;
