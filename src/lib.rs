//! Intervention scheduler - time-slot scheduling for small-group instruction
//!
//! The engine lives in `services::scheduling`; the binary exposes it over
//! NATS (`handlers`) backed by Postgres (`db`).

pub mod cli;
pub mod config;
pub mod db;
pub mod defaults;
pub mod handlers;
pub mod services;
pub mod types;
