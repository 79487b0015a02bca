//! CLI argument parsing for the intervention-scheduler binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::types::WeekDay;

#[derive(Parser)]
#[command(name = "intervention-scheduler", about = "Intervention session scheduling worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Plan from a JSON fixture without NATS or Postgres and print the result
    Plan {
        /// Path to a JSON fixture (groups, students, sessions, cycles, ...)
        #[arg(long)]
        fixture: PathBuf,
        /// Group to schedule; repeat to run a batch in the given order
        #[arg(long = "group", required = true)]
        groups: Vec<Uuid>,
        /// Session length in minutes
        #[arg(long, default_value_t = crate::defaults::DEFAULT_SESSION_DURATION_MINUTES)]
        duration: u32,
        /// Restrict to these weekdays (e.g. monday,wednesday)
        #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
        days: Vec<WeekDay>,
        /// Schedule the current instructional cycle instead of a weekly pattern
        #[arg(long)]
        cycle: bool,
        /// With several groups, reassign times that collide for a shared interventionist
        #[arg(long)]
        balance: bool,
    },
}

fn parse_weekday(raw: &str) -> Result<WeekDay, String> {
    WeekDay::parse(raw).ok_or_else(|| format!("'{}' is not a school weekday", raw))
}
