//! Scheduling handlers
//!
//! Every subject follows the same loop: decode a `Request<T>`, run one
//! engine operation, answer with a `SuccessResponse` or `ErrorResponse`.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::services::scheduling::{EngineSettings, SchedulingEngine};
use crate::types::{
    AutoScheduleRequest, BlockedTimesRequest, CycleScheduleRequest, CycleSchedulingOptions,
    ErrorResponse, GroupSlotsRequest, Request, SchedulingOptions, SuccessResponse, WorkloadRequest,
};

pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const SCHEDULING_ERROR: &str = "SCHEDULING_ERROR";

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Why a request could not be answered with a payload
#[derive(Debug)]
pub enum HandlerError {
    Invalid(String),
    Scheduling(anyhow::Error),
}

impl From<anyhow::Error> for HandlerError {
    fn from(e: anyhow::Error) -> Self {
        HandlerError::Scheduling(e)
    }
}

/// Serialize the reply for one request.
pub fn encode_reply<R: Serialize>(
    request_id: Uuid,
    outcome: std::result::Result<R, HandlerError>,
) -> Result<Vec<u8>> {
    let bytes = match outcome {
        Ok(payload) => serde_json::to_vec(&SuccessResponse::new(request_id, payload))?,
        Err(HandlerError::Invalid(message)) => {
            serde_json::to_vec(&ErrorResponse::new(request_id, INVALID_REQUEST, message))?
        }
        Err(HandlerError::Scheduling(e)) => {
            serde_json::to_vec(&ErrorResponse::new(request_id, SCHEDULING_ERROR, e.to_string()))?
        }
    };
    Ok(bytes)
}

async fn serve<T, R, F, Fut>(client: Client, mut subscriber: Subscriber, subject: &'static str, op: F) -> Result<()>
where
    T: DeserializeOwned,
    R: Serialize,
    F: Fn(T) -> Fut,
    Fut: Future<Output = std::result::Result<R, HandlerError>>,
{
    while let Some(msg) = subscriber.next().await {
        debug!("Received {} message", subject);

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("{} message without reply subject", subject);
                continue;
            }
        };

        let request: Request<T> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse {} request: {}", subject, e);
                let bytes = encode_reply::<()>(Uuid::nil(), Err(HandlerError::Invalid(e.to_string())))?;
                let _ = client.publish(reply, bytes.into()).await;
                continue;
            }
        };

        let outcome = op(request.payload).await;
        if let Err(HandlerError::Scheduling(e)) = &outcome {
            error!("{} failed for request {}: {:#}", subject, request.id, e);
        }

        let bytes = encode_reply(request.id, outcome)?;
        if let Err(e) = client.publish(reply, bytes.into()).await {
            error!("Failed to publish {} reply: {}", subject, e);
        }
    }

    Ok(())
}

/// Handle scheduler.slots.find
pub async fn handle_find_slots(client: Client, subscriber: Subscriber, engine: Arc<SchedulingEngine>) -> Result<()> {
    serve(client, subscriber, "scheduler.slots.find", move |req: GroupSlotsRequest| {
        let engine = engine.clone();
        async move {
            validate_slot_options(&req.options, engine.settings())?;
            Ok::<_, HandlerError>(engine.find_available_slots(req.group_id, &req.options).await?)
        }
    })
    .await
}

/// Handle scheduler.slots.suggest
pub async fn handle_suggest_schedule(
    client: Client,
    subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
) -> Result<()> {
    serve(client, subscriber, "scheduler.slots.suggest", move |req: GroupSlotsRequest| {
        let engine = engine.clone();
        async move {
            validate_slot_options(&req.options, engine.settings())?;
            Ok::<_, HandlerError>(engine.suggest_schedule(req.group_id, &req.options).await?)
        }
    })
    .await
}

/// Handle scheduler.slots.optimal
pub async fn handle_optimal_times(
    client: Client,
    subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
) -> Result<()> {
    serve(client, subscriber, "scheduler.slots.optimal", move |req: GroupSlotsRequest| {
        let engine = engine.clone();
        async move {
            validate_slot_options(&req.options, engine.settings())?;
            Ok::<_, HandlerError>(engine.suggest_optimal_times(req.group_id, &req.options).await?)
        }
    })
    .await
}

/// Handle scheduler.cycle.generate
pub async fn handle_generate_cycle(
    client: Client,
    subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
) -> Result<()> {
    serve(client, subscriber, "scheduler.cycle.generate", move |req: CycleScheduleRequest| {
        let engine = engine.clone();
        async move {
            validate_cycle_options(&req.options, engine.settings())?;
            Ok::<_, HandlerError>(engine.generate_cycle_schedule(req.group_id, &req.options).await?)
        }
    })
    .await
}

/// Handle scheduler.cycle.auto
pub async fn handle_auto_schedule(
    client: Client,
    subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
) -> Result<()> {
    serve(client, subscriber, "scheduler.cycle.auto", move |req: AutoScheduleRequest| {
        let engine = engine.clone();
        async move {
            validate_auto_schedule(&req)?;
            validate_cycle_options(&req.options.cycle, engine.settings())?;
            Ok::<_, HandlerError>(engine
                .auto_schedule_groups_for_cycle(&req.group_ids, req.cycle_id, &req.options)
                .await?)
        }
    })
    .await
}

/// Handle scheduler.workload.get
pub async fn handle_workload(client: Client, subscriber: Subscriber, engine: Arc<SchedulingEngine>) -> Result<()> {
    serve(client, subscriber, "scheduler.workload.get", move |req: WorkloadRequest| {
        let engine = engine.clone();
        async move {
            validate_workload(&req)?;
            Ok::<_, HandlerError>(engine
                .get_interventionist_workload(req.interventionist_id, req.start_date, req.end_date)
                .await?)
        }
    })
    .await
}

/// Handle scheduler.availability.blocked
pub async fn handle_blocked_times(
    client: Client,
    subscriber: Subscriber,
    engine: Arc<SchedulingEngine>,
) -> Result<()> {
    serve(client, subscriber, "scheduler.availability.blocked", move |req: BlockedTimesRequest| {
        let engine = engine.clone();
        async move { Ok::<_, HandlerError>(engine.get_interventionist_blocked_times(req.interventionist_id).await?) }
    })
    .await
}

/// Session length and working window, with unset hours taken from the
/// engine settings.
fn validate_window(
    session_duration: u32,
    start_hour: Option<u32>,
    end_hour: Option<u32>,
    settings: &EngineSettings,
) -> std::result::Result<(), HandlerError> {
    let start = start_hour.unwrap_or(settings.start_hour);
    let end = end_hour.unwrap_or(settings.end_hour);

    if session_duration == 0 || session_duration > MINUTES_PER_DAY {
        return Err(HandlerError::Invalid(format!(
            "sessionDuration must be between 1 and {} minutes",
            MINUTES_PER_DAY
        )));
    }
    if end > 24 {
        return Err(HandlerError::Invalid(format!("endHour {} is past the end of the day", end)));
    }
    if start >= end {
        return Err(HandlerError::Invalid(format!(
            "startHour {} must be before endHour {}",
            start, end
        )));
    }
    Ok(())
}

fn validate_slot_options(
    options: &SchedulingOptions,
    settings: &EngineSettings,
) -> std::result::Result<(), HandlerError> {
    validate_window(options.session_duration, options.start_hour, options.end_hour, settings)
}

fn validate_cycle_options(
    options: &CycleSchedulingOptions,
    settings: &EngineSettings,
) -> std::result::Result<(), HandlerError> {
    validate_window(options.session_duration, options.start_hour, options.end_hour, settings)
}

fn validate_auto_schedule(req: &AutoScheduleRequest) -> std::result::Result<(), HandlerError> {
    if req.group_ids.is_empty() {
        return Err(HandlerError::Invalid("groupIds must not be empty".to_string()));
    }
    Ok(())
}

fn validate_workload(req: &WorkloadRequest) -> std::result::Result<(), HandlerError> {
    if req.start_date > req.end_date {
        return Err(HandlerError::Invalid(format!(
            "startDate {} is after endDate {}",
            req.start_date, req.end_date
        )));
    }
    Ok(())
}
