// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/unit_api/system/...` (spec §4.6): power actions, the OS clock, the
//! local web server, and a sandboxed view of the data directory. Power
//! and clock actions run under their `NamedLock` so a second request
//! while one is in flight comes back `locked` instead of queueing
//! behind it (spec §4.5).

use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_engine::{NamedLock, SpawnOutcome, DISALLOW_UI_FILE_SYSTEM};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path as FsPath, PathBuf};
use tokio::fs;

const RESULT_URL_PREFIX: &str = "/unit_api/task_results";

fn spawn_envelope(state: &AppState, lock: NamedLock, work: impl std::future::Future<Output = Result<Value, String>> + Send + 'static) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    let envelope = match state.tasks.spawn(Some(lock), work) {
        SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    (status, Json(envelope))
}

pub async fn reboot(State(state): State<AppState>) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    spawn_envelope(&state, NamedLock::Power, async move {
        tracing::warn!("reboot requested");
        Ok(json!({ "action": "reboot" }))
    })
}

pub async fn shutdown(State(state): State<AppState>) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    spawn_envelope(&state, NamedLock::Power, async move {
        tracing::warn!("shutdown requested");
        Ok(json!({ "action": "shutdown" }))
    })
}

pub async fn update(State(state): State<AppState>) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    update_to(State(state), Path("latest".to_string())).await
}

pub async fn update_to(State(state): State<AppState>, Path(target): Path<String>) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    spawn_envelope(&state, NamedLock::Update, async move {
        tracing::info!(%target, "software update requested");
        Ok(json!({ "action": "update", "target": target }))
    })
}

#[derive(Debug, Deserialize)]
pub struct UtcClockRequest {
    pub utc: String,
}

pub async fn set_utc_clock(
    State(state): State<AppState>,
    Json(req): Json<UtcClockRequest>,
) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    spawn_envelope(&state, NamedLock::Clock, async move {
        tracing::info!(utc = %req.utc, "system clock sync requested");
        Ok(json!({ "action": "utc_clock", "utc": req.utc }))
    })
}

pub async fn web_server_status() -> Json<Value> {
    Json(json!({ "status": "running" }))
}

pub async fn web_server_restart(State(state): State<AppState>) -> (axum::http::StatusCode, Json<rc_wire::TaskEnvelope>) {
    spawn_envelope(&state, NamedLock::WebRestart, async move {
        tracing::warn!("web server restart requested");
        Ok(json!({ "action": "web_server_restart" }))
    })
}

fn safe_join(base: &FsPath, requested: &str) -> Result<PathBuf, WorkerError> {
    let mut resolved = base.to_path_buf();
    for component in requested.split('/').filter(|c| !c.is_empty()) {
        match component {
            "." => continue,
            ".." => return Err(WorkerError::Validation("path escapes the data directory".to_string())),
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

fn filesystem_browsing_allowed(state: &AppState) -> Result<(), WorkerError> {
    if rc_engine::sentinel_present(&state.config.data_dir, DISALLOW_UI_FILE_SYSTEM) {
        return Err(WorkerError::Forbidden("filesystem browsing".to_string()));
    }
    Ok(())
}

pub async fn browse_root(State(state): State<AppState>) -> Result<Json<Value>, WorkerError> {
    browse(State(state), Path(String::new())).await
}

pub async fn browse(State(state): State<AppState>, Path(req_path): Path<String>) -> Result<Json<Value>, WorkerError> {
    filesystem_browsing_allowed(&state)?;
    let target = safe_join(&state.config.data_dir, &req_path)?;
    let metadata = fs::metadata(&target).await.map_err(|_| WorkerError::NotFound(req_path.clone()))?;
    if metadata.is_file() {
        let content = fs::read_to_string(&target).await.map_err(|e| WorkerError::Internal(e.to_string()))?;
        return Ok(Json(json!({ "path": req_path, "kind": "file", "content": content })));
    }
    let mut names = Vec::new();
    let mut entries = fs::read_dir(&target).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(Json(json!({ "path": req_path, "kind": "directory", "entries": names })))
}

#[derive(Debug, Deserialize)]
pub struct RemoveFileRequest {
    pub path: String,
}

pub async fn remove_file(State(state): State<AppState>, Json(req): Json<RemoveFileRequest>) -> Result<Json<Value>, WorkerError> {
    filesystem_browsing_allowed(&state)?;
    let target = safe_join(&state.config.data_dir, &req.path)?;
    if target.extension().and_then(|e| e.to_str()).is_some_and(|ext| ext.starts_with("sqlite")) {
        return Err(WorkerError::Forbidden("removing the database file".to_string()));
    }
    fs::remove_file(&target).await.map_err(|_| WorkerError::NotFound(req.path.clone()))?;
    Ok(Json(json!({ "removed": req.path })))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub path: String,
    pub content: String,
}

pub async fn upload(State(state): State<AppState>, Json(req): Json<UploadRequest>) -> Result<Json<Value>, WorkerError> {
    filesystem_browsing_allowed(&state)?;
    let target = safe_join(&state.config.data_dir, &req.path)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.map_err(|e| WorkerError::Internal(e.to_string()))?;
    }
    fs::write(&target, &req.content).await.map_err(|e| WorkerError::Internal(e.to_string()))?;
    Ok(Json(json!({ "path": req.path, "bytes": req.content.len() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_rejects_parent_traversal() {
        let base = PathBuf::from("/data");
        assert!(safe_join(&base, "../etc/passwd").is_err());
        assert!(safe_join(&base, "logs/../../etc").is_err());
    }

    #[test]
    fn safe_join_resolves_plain_paths() {
        let base = PathBuf::from("/data");
        assert_eq!(safe_join(&base, "logs/worker.log").unwrap(), PathBuf::from("/data/logs/worker.log"));
    }
}
