//! Business logic services

pub mod repository;
pub mod scheduling;
