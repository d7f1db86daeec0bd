// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/workers/<u>/jobs/...` (spec §4.7): run/update/stop a job on a
//! single unit, fronted by the `TaskQueue` for run/stop.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_core::TaskState;
use rc_engine::SpawnOutcome;
use rc_wire::run_job::RunJobPayload;
use serde_json::Value;

const RESULT_URL_PREFIX: &str = "/api/task_results";

fn envelope_for(outcome: SpawnOutcome) -> rc_wire::TaskEnvelope {
    match outcome {
        SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    }
}

pub async fn run(
    State(state): State<AppState>,
    Path((unit, experiment, job)): Path<(String, String, String)>,
    Json(payload): Json<RunJobPayload>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let outcome = state.orchestrator.run_job(&unit, &experiment, &job, payload).await?;
    let envelope = envelope_for(outcome);
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    Ok((status, Json(envelope)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((unit, experiment, job)): Path<(String, String, String)>,
    Json(settings): Json<indexmap::IndexMap<String, Value>>,
) -> Result<Json<Value>, LeaderError> {
    state.orchestrator.update_job_settings(&unit, &experiment, &job, &settings).await?;
    Ok(Json(serde_json::json!({ "pioreactor_unit": unit, "job_name": job, "updated": settings.len() })))
}

pub async fn stop(
    State(state): State<AppState>,
    Path((unit, experiment, job)): Path<(String, String, String)>,
) -> Result<Json<Value>, LeaderError> {
    state.orchestrator.stop_job(&unit, &experiment, &job).await?;
    Ok(Json(serde_json::json!({ "pioreactor_unit": unit, "job_name": job, "state": "disconnected" })))
}

pub async fn stop_all(
    State(state): State<AppState>,
    Path(unit): Path<String>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let outcome = state.orchestrator.stop_all_jobs(&unit).await?;
    let envelope = envelope_for(outcome);
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    Ok((status, Json(envelope)))
}

pub async fn task_result(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let task_id: rc_core::TaskId = task_id.as_str().into();
    let envelope = match state.orchestrator.tasks().get(&task_id) {
        None => rc_wire::TaskEnvelope::pending(task_id, RESULT_URL_PREFIX),
        Some(snapshot) => match snapshot.state {
            TaskState::Complete => {
                rc_wire::TaskEnvelope::complete(task_id, RESULT_URL_PREFIX, snapshot.result.unwrap_or(Value::Null))
            }
            TaskState::Failed => {
                rc_wire::TaskEnvelope::failed(task_id, RESULT_URL_PREFIX, snapshot.error.unwrap_or_default())
            }
            TaskState::Locked => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, snapshot.lock.unwrap_or("lock")),
            TaskState::InProgress | TaskState::Pending => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        },
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::OK);
    Ok((status, Json(envelope)))
}
