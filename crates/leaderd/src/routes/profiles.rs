// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/contrib/experiment_profiles[/<filename>]` (spec §4.7): YAML
//! documents validated against a fixed schema and kept as plain files
//! under the leader's data directory, the same filesystem-backed CRUD
//! shape `system::upload`/`system::remove_file` already use for the
//! rest of the leader's local state.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_wire::validate_experiment_profile;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

const PROFILES_SUBDIR: &str = "experiment_profiles";

fn profiles_dir(state: &AppState) -> std::path::PathBuf {
    state.config.data_path(PROFILES_SUBDIR)
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, LeaderError> {
    let dir = profiles_dir(&state);
    let mut names = Vec::new();
    if let Ok(mut entries) = fs::read_dir(&dir).await {
        while let Some(entry) = entries.next_entry().await.map_err(|e| LeaderError::Internal(e.to_string()))? {
            if let Some(name) = entry.file_name().to_str() {
                if rc_wire::is_profile_filename(name) {
                    names.push(name.to_string());
                }
            }
        }
    }
    names.sort();
    Ok(Json(json!({ "profiles": names })))
}

pub async fn get(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Json<Value>, LeaderError> {
    if !rc_wire::is_profile_filename(&filename) {
        return Err(LeaderError::Validation(format!("{filename:?} is not a portable .yaml/.yml filename")));
    }
    let path = profiles_dir(&state).join(&filename);
    let body = fs::read_to_string(&path).await.map_err(|_| LeaderError::NotFound(format!("experiment profile {filename:?}")))?;
    Ok(Json(json!({ "filename": filename, "body": body })))
}

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    pub body: String,
}

async fn write_profile(state: &AppState, filename: &str, body: &str, overwrite: bool) -> Result<(), LeaderError> {
    let profile = validate_experiment_profile(filename, body).map_err(|e| LeaderError::Validation(e.to_string()))?;
    let _ = profile;
    let dir = profiles_dir(state);
    fs::create_dir_all(&dir).await.map_err(|e| LeaderError::Internal(e.to_string()))?;
    let path = dir.join(filename);
    if !overwrite && fs::metadata(&path).await.is_ok() {
        return Err(LeaderError::Conflict(format!("experiment profile {filename:?}")));
    }
    fs::write(&path, body).await.map_err(|e| LeaderError::Internal(e.to_string()))?;
    Ok(())
}

pub async fn create(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<ProfileBody>,
) -> Result<Json<Value>, LeaderError> {
    write_profile(&state, &filename, &req.body, false).await?;
    Ok(Json(json!({ "filename": filename })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<ProfileBody>,
) -> Result<Json<Value>, LeaderError> {
    if !rc_wire::is_profile_filename(&filename) {
        return Err(LeaderError::Validation(format!("{filename:?} is not a portable .yaml/.yml filename")));
    }
    let path = profiles_dir(&state).join(&filename);
    if fs::metadata(&path).await.is_err() {
        return Err(LeaderError::NotFound(format!("experiment profile {filename:?}")));
    }
    write_profile(&state, &filename, &req.body, true).await?;
    Ok(Json(json!({ "filename": filename })))
}

pub async fn delete(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Json<Value>, LeaderError> {
    if !rc_wire::is_profile_filename(&filename) {
        return Err(LeaderError::Validation(format!("{filename:?} is not a portable .yaml/.yml filename")));
    }
    let path = profiles_dir(&state).join(&filename);
    fs::remove_file(&path).await.map_err(|_| LeaderError::NotFound(format!("experiment profile {filename:?}")))?;
    Ok(Json(json!({ "removed": filename })))
}
