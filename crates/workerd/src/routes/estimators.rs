// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/unit_api/estimators[...]` and `/unit_api/active_estimators[...]`
//! (spec §4.6) — analogous to `routes::calibrations`, backed by the
//! same `device_store` plumbing over the estimators directory.

use crate::device_store;
use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list_devices(State(state): State<AppState>) -> Result<Json<Value>, WorkerError> {
    let devices = device_store::list_devices(&state.config.estimators_dir()).await?;
    Ok(Json(json!({ "devices": devices })))
}

pub async fn list_for_device(State(state): State<AppState>, Path(device): Path<String>) -> Result<Json<Value>, WorkerError> {
    let names = device_store::list_names(&state.config.estimators_dir(), &device).await?;
    Ok(Json(json!({ "device": device, "estimators": names })))
}

pub async fn get(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    let doc = device_store::read(&state.config.estimators_dir(), &device, &name).await?;
    Ok(Json(serde_json::to_value(doc).unwrap_or(Value::Null)))
}

#[derive(Debug, Deserialize)]
pub struct CreateEstimatorRequest {
    pub name: String,
    pub document: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path(device): Path<String>,
    Json(req): Json<CreateEstimatorRequest>,
) -> Result<Json<Value>, WorkerError> {
    device_store::write(&state.config.estimators_dir(), &device, &req.name, &req.document).await?;
    Ok(Json(json!({ "device": device, "name": req.name })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    let deleted = device_store::delete(&state.config.estimators_dir(), &device, &name).await?;
    if !deleted {
        return Err(WorkerError::NotFound(format!("estimator {device}/{name}")));
    }
    Ok(Json(json!({ "device": device, "name": name })))
}

pub async fn set_active(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    device_store::read(&state.config.estimators_dir(), &device, &name).await?;
    state.active_estimators.set(&device, &name).await?;
    Ok(Json(json!({ "device": device, "active": name })))
}

pub async fn clear_active(State(state): State<AppState>, Path(device): Path<String>) -> Result<Json<Value>, WorkerError> {
    state.active_estimators.clear(&device).await?;
    Ok(Json(json!({ "device": device, "active": Value::Null })))
}
