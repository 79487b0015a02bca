//! Configuration management

use std::str::FromStr;

use anyhow::{self, Context, Result};

use crate::defaults::{DEFAULT_END_HOUR, DEFAULT_SLOT_INTERVAL_MINUTES, DEFAULT_START_HOUR};
use crate::services::scheduling::EngineSettings;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string. Only `serve` and `migrate` need it.
    pub database_url: Option<String>,

    /// Working window and slot granularity for requests that omit them
    pub engine: EngineSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL").ok();

        let engine = EngineSettings {
            start_hour: env_or("SCHEDULE_START_HOUR", DEFAULT_START_HOUR)?,
            end_hour: env_or("SCHEDULE_END_HOUR", DEFAULT_END_HOUR)?,
            slot_interval_minutes: env_or("SLOT_INTERVAL_MINUTES", DEFAULT_SLOT_INTERVAL_MINUTES)?,
        };
        validate_engine_settings(&engine)?;

        Ok(Self {
            nats_url,
            database_url,
            engine,
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

pub fn validate_engine_settings(settings: &EngineSettings) -> Result<()> {
    if settings.start_hour >= settings.end_hour {
        anyhow::bail!(
            "SCHEDULE_START_HOUR ({}) must be before SCHEDULE_END_HOUR ({})",
            settings.start_hour,
            settings.end_hour
        );
    }
    if settings.end_hour > 24 {
        anyhow::bail!("SCHEDULE_END_HOUR must be at most 24 (got {})", settings.end_hour);
    }
    if settings.slot_interval_minutes == 0 {
        anyhow::bail!("SLOT_INTERVAL_MINUTES must be greater than zero");
    }
    Ok(())
}
