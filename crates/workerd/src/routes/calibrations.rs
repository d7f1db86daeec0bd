// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/unit_api/calibrations[...]` and `/unit_api/active_calibrations[...]`
//! (spec §4.6).

use crate::device_store;
use crate::error::WorkerError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list_devices(State(state): State<AppState>) -> Result<Json<Value>, WorkerError> {
    let devices = device_store::list_devices(&state.config.calibrations_dir()).await?;
    Ok(Json(json!({ "devices": devices })))
}

pub async fn list_for_device(State(state): State<AppState>, Path(device): Path<String>) -> Result<Json<Value>, WorkerError> {
    let names = device_store::list_names(&state.config.calibrations_dir(), &device).await?;
    Ok(Json(json!({ "device": device, "calibrations": names })))
}

pub async fn get(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    let doc = device_store::read(&state.config.calibrations_dir(), &device, &name).await?;
    Ok(Json(serde_yaml_to_json(doc)))
}

#[derive(Debug, Deserialize)]
pub struct CreateCalibrationRequest {
    pub name: String,
    pub document: String,
}

pub async fn create(
    State(state): State<AppState>,
    Path(device): Path<String>,
    Json(req): Json<CreateCalibrationRequest>,
) -> Result<Json<Value>, WorkerError> {
    device_store::write(&state.config.calibrations_dir(), &device, &req.name, &req.document).await?;
    Ok(Json(json!({ "device": device, "name": req.name })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    let deleted = device_store::delete(&state.config.calibrations_dir(), &device, &name).await?;
    if !deleted {
        return Err(WorkerError::NotFound(format!("calibration {device}/{name}")));
    }
    Ok(Json(json!({ "device": device, "name": name })))
}

pub async fn set_active(
    State(state): State<AppState>,
    Path((device, name)): Path<(String, String)>,
) -> Result<Json<Value>, WorkerError> {
    device_store::read(&state.config.calibrations_dir(), &device, &name).await?;
    state.active_calibrations.set(&device, &name).await?;
    Ok(Json(json!({ "device": device, "active": name })))
}

pub async fn clear_active(State(state): State<AppState>, Path(device): Path<String>) -> Result<Json<Value>, WorkerError> {
    state.active_calibrations.clear(&device).await?;
    Ok(Json(json!({ "device": device, "active": Value::Null })))
}

fn serde_yaml_to_json(doc: serde_yaml::Value) -> Value {
    serde_json::to_value(doc).unwrap_or(Value::Null)
}
