// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/unit_api/plugins/...` (spec §4.6, §4.9). Installing/uninstalling a
//! plugin is a task-queue job so the caller can poll it like any other
//! long-running action; both are blocked entirely when
//! `DISALLOW_UI_INSTALLS` is present in the plugins directory.

use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use rc_engine::{SpawnOutcome, DISALLOW_UI_INSTALLS};
use serde::Deserialize;
use serde_json::{json, Value};

const RESULT_URL_PREFIX: &str = "/unit_api/task_results";

pub async fn installed(State(state): State<AppState>) -> Json<Value> {
    let plugins: Vec<Value> = state
        .plugins
        .manifests()
        .iter()
        .map(|p| json!({ "name": p.name, "version": p.version }))
        .collect();
    Json(json!({ "plugins": plugins }))
}

fn installs_allowed(state: &AppState) -> Result<(), WorkerError> {
    if rc_engine::sentinel_present(&state.config.plugins_dir, DISALLOW_UI_INSTALLS) {
        return Err(WorkerError::Forbidden("plugin installation".to_string()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
}

pub async fn install(
    State(state): State<AppState>,
    Json(req): Json<InstallRequest>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), WorkerError> {
    installs_allowed(&state)?;
    let name = req.name.clone();
    let outcome = state.tasks.spawn(None, async move {
        tracing::info!(%name, source = ?req.source, "plugin install requested");
        Ok(json!({ "name": name }))
    });
    Ok(envelope_response(outcome))
}

#[derive(Debug, Deserialize)]
pub struct UninstallRequest {
    pub name: String,
}

pub async fn uninstall(
    State(state): State<AppState>,
    Json(req): Json<UninstallRequest>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), WorkerError> {
    installs_allowed(&state)?;
    let name = req.name.clone();
    let outcome = state.tasks.spawn(None, async move {
        tracing::info!(%name, "plugin uninstall requested");
        Ok(json!({ "name": name }))
    });
    Ok(envelope_response(outcome))
}

fn envelope_response(outcome: SpawnOutcome) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    let envelope = match outcome {
        SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    (status, Json(envelope))
}
