// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/workers/<u>/system/...` and `/api/system/...` (spec §4.6
//! supplement, §6 `pios reboot|shutdown|update`, `pios cp|rm`):
//! power/update/plugin actions fan out to WorkerAPI through the
//! `Orchestrator`, while file upload/removal act on the leader's own
//! data directory directly, the same split `rc-workerd`'s `system`
//! module draws between unit actions and local filesystem ones.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_adapters::Payload;
use rc_engine::{NamedLock, SpawnOutcome, DISALLOW_UI_FILE_SYSTEM, DISALLOW_UI_INSTALLS};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

const RESULT_URL_PREFIX: &str = "/api/task_results";

fn envelope_for(outcome: SpawnOutcome) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    let envelope = match outcome {
        SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    (status, Json(envelope))
}

pub async fn reboot(
    State(state): State<AppState>,
    Path(unit): Path<String>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let outcome = state.orchestrator.forward_to_units(&unit, "/unit_api/system/reboot", Payload::None, Some(NamedLock::Power)).await?;
    Ok(envelope_for(outcome))
}

pub async fn shutdown(
    State(state): State<AppState>,
    Path(unit): Path<String>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let outcome = state.orchestrator.forward_to_units(&unit, "/unit_api/system/shutdown", Payload::None, Some(NamedLock::Power)).await?;
    Ok(envelope_for(outcome))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateRequest {
    pub branch: Option<String>,
    pub version: Option<String>,
    pub source: Option<String>,
    pub repo: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path((unit, target)): Path<(String, String)>,
    body: Option<Json<UpdateRequest>>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let payload = Payload::Shared(json!({
        "branch": req.branch, "version": req.version, "source": req.source, "repo": req.repo,
    }));
    let path = format!("/unit_api/system/update/{target}");
    let outcome = state.orchestrator.forward_to_units(&unit, &path, payload, Some(NamedLock::Update)).await?;
    Ok(envelope_for(outcome))
}

#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub name: String,
    pub source: Option<String>,
}

pub async fn plugin_install(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Json(req): Json<InstallRequest>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    if rc_engine::sentinel_present(&state.config.plugins_dir, DISALLOW_UI_INSTALLS) {
        return Err(LeaderError::Forbidden("plugin installation".to_string()));
    }
    let payload = Payload::Shared(json!({ "name": req.name, "source": req.source }));
    let outcome = state.orchestrator.forward_to_units(&unit, "/unit_api/plugins/install", payload, None).await?;
    Ok(envelope_for(outcome))
}

#[derive(Debug, Deserialize)]
pub struct UninstallRequest {
    pub name: String,
}

pub async fn plugin_uninstall(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Json(req): Json<UninstallRequest>,
) -> Result<(axum::http::StatusCode, Json<rc_wire::TaskEnvelope>), LeaderError> {
    if rc_engine::sentinel_present(&state.config.plugins_dir, DISALLOW_UI_INSTALLS) {
        return Err(LeaderError::Forbidden("plugin installation".to_string()));
    }
    let payload = Payload::Shared(json!({ "name": req.name }));
    let outcome = state.orchestrator.forward_to_units(&unit, "/unit_api/plugins/uninstall", payload, None).await?;
    Ok(envelope_for(outcome))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
}

pub async fn upload(State(state): State<AppState>, Json(req): Json<UploadRequest>) -> Result<Json<Value>, LeaderError> {
    if rc_engine::sentinel_present(&state.config.data_dir, DISALLOW_UI_FILE_SYSTEM) {
        return Err(LeaderError::Forbidden("filesystem access".to_string()));
    }
    if !rc_wire::is_portable_filename(&req.filename) {
        return Err(LeaderError::Validation(format!("{:?} is not a portable filename", req.filename)));
    }
    let target = state.config.data_path(&req.filename);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.map_err(|e| LeaderError::Internal(e.to_string()))?;
    }
    fs::write(&target, &req.content).await.map_err(|e| LeaderError::Internal(e.to_string()))?;
    Ok(Json(json!({ "filename": req.filename, "bytes": req.content.len() })))
}

#[derive(Debug, Deserialize)]
pub struct RemoveFileRequest {
    pub path: String,
}

pub async fn remove_file(State(state): State<AppState>, Json(req): Json<RemoveFileRequest>) -> Result<Json<Value>, LeaderError> {
    if rc_engine::sentinel_present(&state.config.data_dir, DISALLOW_UI_FILE_SYSTEM) {
        return Err(LeaderError::Forbidden("filesystem access".to_string()));
    }
    let target = state.config.data_path(&req.path);
    if target.extension().and_then(|e| e.to_str()).is_some_and(|ext| ext.starts_with("sqlite")) {
        return Err(LeaderError::Forbidden("removing the database file".to_string()));
    }
    fs::remove_file(&target).await.map_err(|_| LeaderError::NotFound(req.path.clone()))?;
    Ok(Json(json!({ "removed": req.path })))
}

pub async fn is_local_access_point_active(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "is_active": state.config.is_local_access_point }))
}
