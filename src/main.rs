//! Intervention Scheduler Worker - scheduling engine service
//!
//! This worker connects to NATS and answers scheduling requests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use intervention_scheduler::cli::{Cli, Command};
use intervention_scheduler::config::Config;
use intervention_scheduler::db;
use intervention_scheduler::handlers;
use intervention_scheduler::services::repository::InMemoryStore;
use intervention_scheduler::services::scheduling::{EngineSettings, SchedulingEngine};
use intervention_scheduler::types::{
    BatchSchedulingOptions, CycleSchedulingOptions, SchedulingOptions, WeekDay,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // `plan` prints JSON on stdout, so its console logs go to stderr
    let quiet_stdout = matches!(cli.command, Some(Command::Plan { .. }));

    // Logs directory - use LOGS_DIR env var or default to ../logs
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "scheduler.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - console and file
    let stdout_layer = (!quiet_stdout).then(|| tracing_subscriber::fmt::layer());
    let stderr_layer = quiet_stdout.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,intervention_scheduler=debug".into()),
        ))
        .with(stdout_layer)
        .with(stderr_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)) // file
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let result = match cli.command {
        None | Some(Command::Serve) => serve(&config).await,
        Some(Command::Migrate) => migrate(&config).await,
        Some(Command::Plan {
            fixture,
            groups,
            duration,
            days,
            cycle,
            balance,
        }) => plan(config.engine, &fixture, &groups, duration, days, cycle, balance).await,
    };

    if let Err(e) = &result {
        error!("Fatal: {:#}", e);
    }
    result
}

async fn serve(config: &Config) -> Result<()> {
    info!("Starting Intervention Scheduler Worker...");

    // Connect to database
    let pool = db::create_pool(config.require_database_url()?).await?;
    info!("Connected to PostgreSQL");

    // Run migrations
    db::run_migrations(&pool).await?;

    let repository = Arc::new(db::PgRepository::new(pool));
    let engine = Arc::new(SchedulingEngine::new(
        repository.clone(),
        repository.clone(),
        repository,
        config.engine,
    ));
    info!(
        "Scheduling engine ready ({:02}:00-{:02}:00, {} min slots)",
        config.engine.start_hour, config.engine.end_hour, config.engine.slot_interval_minutes
    );

    // Connect to NATS (supports optional NATS_USER/NATS_PASSWORD auth).
    let nats_client = match (std::env::var("NATS_USER"), std::env::var("NATS_PASSWORD")) {
        (Ok(user), Ok(password)) if !user.is_empty() => {
            async_nats::ConnectOptions::new()
                .user_and_password(user, password)
                .connect(&config.nats_url)
                .await?
        }
        _ => async_nats::connect(&config.nats_url).await?,
    };
    info!("Connected to NATS at {}", config.nats_url);

    // Start message handlers
    handlers::start_handlers(nats_client, engine).await
}

async fn migrate(config: &Config) -> Result<()> {
    let pool = db::create_pool(config.require_database_url()?).await?;
    db::run_migrations(&pool).await
}

async fn plan(
    settings: EngineSettings,
    fixture: &Path,
    groups: &[Uuid],
    duration: u32,
    days: Vec<WeekDay>,
    cycle: bool,
    balance: bool,
) -> Result<()> {
    let store = Arc::new(InMemoryStore::from_json_file(fixture)?);
    info!(
        "Loaded fixture {} ({} groups, {} sessions)",
        fixture.display(),
        store.groups.len(),
        store.sessions.len()
    );
    let engine = SchedulingEngine::new(store.clone(), store.clone(), store, settings);

    let output = if cycle {
        let options = BatchSchedulingOptions {
            cycle: CycleSchedulingOptions {
                session_duration: duration,
                preferred_days: days,
                ..CycleSchedulingOptions::default()
            },
            balance_workload: balance,
        };
        let results = engine
            .auto_schedule_groups_for_cycle(groups, None, &options)
            .await?;
        serde_json::to_string_pretty(&results.into_iter().collect::<BTreeMap<_, _>>())?
    } else {
        let options = SchedulingOptions {
            session_duration: duration,
            preferred_days: (!days.is_empty()).then_some(days),
            ..SchedulingOptions::default()
        };
        let mut suggestions = BTreeMap::new();
        for group_id in groups {
            let slots = engine.suggest_schedule(*group_id, &options).await?;
            suggestions.insert(*group_id, slots);
        }
        serde_json::to_string_pretty(&suggestions)?
    };

    println!("{}", output);
    Ok(())
}
