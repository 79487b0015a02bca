//! Database queries

pub mod calendar;
pub mod group;
pub mod session;
