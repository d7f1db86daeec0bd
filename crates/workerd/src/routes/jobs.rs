// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/unit_api/jobs/...` and `/unit_api/task_results/<id>` (spec §4.6).

use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_core::TaskState;
use rc_wire::run_job::RunJobPayload;
use serde::Deserialize;
use serde_json::{json, Value};

const RESULT_URL_PREFIX: &str = "/unit_api/task_results";

pub async fn run(
    State(state): State<AppState>,
    Path(job): Path<String>,
    Json(payload): Json<RunJobPayload>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), WorkerError> {
    if let Err(retry_after) = state.debouncer.check_and_record(&job) {
        return Err(WorkerError::RateLimited { retry_after_ms: retry_after.as_millis() as u64 });
    }

    let experiment = payload.env.get("EXPERIMENT").cloned().unwrap_or_default();
    let job_name = job.clone();
    let jobs = state.jobs.clone();
    let outcome = state.tasks.spawn(None, async move {
        jobs.start(&job_name, &experiment, "user", true);
        Ok(json!({ "job_name": job_name, "experiment": experiment }))
    });

    let envelope = match outcome {
        rc_engine::SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        rc_engine::SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    Ok((status, Json(envelope)))
}

#[derive(Debug, Default, Deserialize)]
pub struct StopRequest {
    pub job_name: Option<String>,
    pub experiment: Option<String>,
    pub job_source: Option<String>,
    #[allow(dead_code)]
    pub job_id: Option<String>,
}

pub async fn stop(State(state): State<AppState>, Json(req): Json<StopRequest>) -> Json<Value> {
    let stopped = state.jobs.stop_matching(req.job_name.as_deref(), req.experiment.as_deref(), req.job_source.as_deref());
    Json(json!({ "stopped": stopped }))
}

pub async fn stop_all(State(state): State<AppState>) -> Json<Value> {
    let stopped = state.jobs.stop_all();
    Json(json!({ "stopped": stopped }))
}

pub async fn running(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "jobs": state.jobs.all() }))
}

pub async fn running_job(State(state): State<AppState>, Path(job_name): Path<String>) -> Result<Json<Value>, WorkerError> {
    let job = state.jobs.get(&job_name).ok_or_else(|| WorkerError::NotFound(format!("job {job_name:?}")))?;
    Ok(Json(serde_json::to_value(job).unwrap_or(Value::Null)))
}

pub async fn running_for_experiment(State(state): State<AppState>, Path(experiment): Path<String>) -> Json<Value> {
    Json(json!({ "jobs": state.jobs.for_experiment(&experiment) }))
}

pub async fn long_running(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "jobs": state.jobs.long_running() }))
}

pub async fn settings_for_job(State(state): State<AppState>, Path(job_name): Path<String>) -> Json<Value> {
    Json(json!({ "job_name": job_name, "settings": state.settings.for_job(&job_name) }))
}

pub async fn setting(
    State(state): State<AppState>,
    Path((job_name, setting)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    let value = state.settings.get(&job_name, &setting).ok_or_else(|| WorkerError::NotFound(format!("setting {setting:?}")))?;
    Ok(Json(json!({ "job_name": job_name, "setting": setting, "value": value })))
}

/// `PATCH /jobs/settings/job_name/<job>` — declared but not implemented
/// (spec §9 Open Questions, resolved Bus-only in SPEC_FULL §9): settings
/// are only ever changed over the control bus, never via a direct
/// worker-local setter.
pub async fn update_setting() -> WorkerError {
    WorkerError::NotImplemented
}

pub async fn task_result(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    let task_id: rc_core::TaskId = task_id.as_str().into();
    let envelope = match state.tasks.get(&task_id) {
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
    (status, Json(envelope))
}
