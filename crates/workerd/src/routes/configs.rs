// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /unit_api/configs/<filename>` — the worker side of the
//! leader's config push. The leader validates and renders the INI, then
//! calls `Orchestrator::schedule_config_sync` to multicast the rendered
//! document here; this handler just writes it under the worker's data
//! directory (spec §4.7 "the leader pushes config files to workers it
//! targets").

use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use rc_wire::is_portable_filename;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

#[derive(Debug, Deserialize)]
pub struct PushConfigRequest {
    pub content: String,
}

pub async fn push(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<PushConfigRequest>,
) -> Result<Json<Value>, WorkerError> {
    if !is_portable_filename(&filename) {
        return Err(WorkerError::Validation(format!("{filename:?} is not a valid config filename")));
    }
    let normalized = rc_wire::validate_config_ini(&req.content).map_err(|e| WorkerError::Validation(e.to_string()))?;

    let dir = state.config.data_path("configs");
    fs::create_dir_all(&dir).await?;
    fs::write(dir.join(&filename), &normalized).await?;

    tracing::info!(%filename, "config file synced from leader");
    Ok(Json(json!({ "filename": filename })))
}
