//! NATS message handlers

pub mod ping;
pub mod schedule;

use std::sync::Arc;

use anyhow::Result;
use async_nats::Client;
use tokio::select;
use tracing::{error, info};

use crate::services::scheduling::SchedulingEngine;

pub const SUBJECT_PING: &str = "scheduler.ping";
pub const SUBJECT_SLOTS_FIND: &str = "scheduler.slots.find";
pub const SUBJECT_SLOTS_SUGGEST: &str = "scheduler.slots.suggest";
pub const SUBJECT_SLOTS_OPTIMAL: &str = "scheduler.slots.optimal";
pub const SUBJECT_CYCLE_GENERATE: &str = "scheduler.cycle.generate";
pub const SUBJECT_CYCLE_AUTO: &str = "scheduler.cycle.auto";
pub const SUBJECT_WORKLOAD_GET: &str = "scheduler.workload.get";
pub const SUBJECT_AVAILABILITY_BLOCKED: &str = "scheduler.availability.blocked";

/// Start all message handlers
pub async fn start_handlers(client: Client, engine: Arc<SchedulingEngine>) -> Result<()> {
    info!("Starting message handlers...");

    // Subscribe to all subjects
    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let find_sub = client.subscribe(SUBJECT_SLOTS_FIND).await?;
    let suggest_sub = client.subscribe(SUBJECT_SLOTS_SUGGEST).await?;
    let optimal_sub = client.subscribe(SUBJECT_SLOTS_OPTIMAL).await?;
    let cycle_sub = client.subscribe(SUBJECT_CYCLE_GENERATE).await?;
    // The batch handler processes one request at a time so concurrent
    // batches never interleave their slot claims.
    let auto_sub = client.subscribe(SUBJECT_CYCLE_AUTO).await?;
    let workload_sub = client.subscribe(SUBJECT_WORKLOAD_GET).await?;
    let blocked_sub = client.subscribe(SUBJECT_AVAILABILITY_BLOCKED).await?;

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move { ping::handle_ping(client_ping, ping_sub).await });

    let (client_find, engine_find) = (client.clone(), engine.clone());
    let find_handle = tokio::spawn(async move {
        schedule::handle_find_slots(client_find, find_sub, engine_find).await
    });

    let (client_suggest, engine_suggest) = (client.clone(), engine.clone());
    let suggest_handle = tokio::spawn(async move {
        schedule::handle_suggest_schedule(client_suggest, suggest_sub, engine_suggest).await
    });

    let (client_optimal, engine_optimal) = (client.clone(), engine.clone());
    let optimal_handle = tokio::spawn(async move {
        schedule::handle_optimal_times(client_optimal, optimal_sub, engine_optimal).await
    });

    let (client_cycle, engine_cycle) = (client.clone(), engine.clone());
    let cycle_handle = tokio::spawn(async move {
        schedule::handle_generate_cycle(client_cycle, cycle_sub, engine_cycle).await
    });

    let (client_auto, engine_auto) = (client.clone(), engine.clone());
    let auto_handle = tokio::spawn(async move {
        schedule::handle_auto_schedule(client_auto, auto_sub, engine_auto).await
    });

    let (client_workload, engine_workload) = (client.clone(), engine.clone());
    let workload_handle = tokio::spawn(async move {
        schedule::handle_workload(client_workload, workload_sub, engine_workload).await
    });

    let (client_blocked, engine_blocked) = (client.clone(), engine);
    let blocked_handle = tokio::spawn(async move {
        schedule::handle_blocked_times(client_blocked, blocked_sub, engine_blocked).await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = find_handle => {
            error!("Slots find handler finished: {:?}", result);
        }
        result = suggest_handle => {
            error!("Slots suggest handler finished: {:?}", result);
        }
        result = optimal_handle => {
            error!("Slots optimal handler finished: {:?}", result);
        }
        result = cycle_handle => {
            error!("Cycle generate handler finished: {:?}", result);
        }
        result = auto_handle => {
            error!("Cycle auto handler finished: {:?}", result);
        }
        result = workload_handle => {
            error!("Workload handler finished: {:?}", result);
        }
        result = blocked_handle => {
            error!("Availability blocked handler finished: {:?}", result);
        }
    }

    Ok(())
}
