// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/configs/<filename>` (spec §4.7): validate and record a config
//! body, then push it to every targeted unit via
//! `Orchestrator::schedule_config_sync`.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rc_storage::config_history;
use rc_wire::targeting::TargetQuery;
use rc_wire::validate_config_ini;
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn get(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Json<Value>, LeaderError> {
    let code = config_history::latest(&state.store, &filename)
        .await?
        .ok_or_else(|| LeaderError::NotFound(format!("config {filename:?}")))?;
    Ok(Json(json!({ "filename": filename, "code": code })))
}

#[derive(Debug, Deserialize)]
pub struct PushConfigRequest {
    pub code: String,
    #[serde(default)]
    pub targets: TargetQuery,
}

pub async fn push(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<PushConfigRequest>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let normalized = validate_config_ini(&req.code).map_err(|e| LeaderError::Validation(e.to_string()))?;
    config_history::record(&state.store, &filename, &normalized, Utc::now()).await?;

    let targets = state.orchestrator.resolve_targets(&req.targets).await?;
    let targets = targets.into_iter().map(|u| u.to_string()).collect();

    let outcome = state.orchestrator.schedule_config_sync(targets, filename, normalized);
    let envelope = match outcome {
        rc_engine::SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, "/api/task_results"),
        rc_engine::SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, "/api/task_results", lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    Ok((status, Json(envelope)))
}
