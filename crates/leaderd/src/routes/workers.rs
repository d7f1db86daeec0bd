// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/workers/...` (spec §4.7): worker inventory CRUD, assignment,
//! and model metadata.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rc_storage::{assignments, workers};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, LeaderError> {
    let rows = workers::list(&state.store).await?;
    Ok(Json(json!({ "workers": rows })))
}

#[derive(Debug, Deserialize)]
pub struct AddWorkerRequest {
    pub pioreactor_unit: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
}

fn default_true() -> bool {
    true
}

pub async fn add(State(state): State<AppState>, Json(req): Json<AddWorkerRequest>) -> Result<Json<Value>, LeaderError> {
    let inserted = workers::insert(
        &state.store,
        &req.pioreactor_unit,
        req.is_active,
        req.model_name.as_deref(),
        req.model_version.as_deref(),
        Utc::now(),
    )
    .await?;
    if !inserted {
        return Err(LeaderError::Conflict(format!("worker {:?}", req.pioreactor_unit)));
    }
    Ok(Json(json!({ "pioreactor_unit": req.pioreactor_unit })))
}

pub async fn get(State(state): State<AppState>, Path(unit): Path<String>) -> Result<Json<Value>, LeaderError> {
    let row = workers::get(&state.store, &unit).await?.ok_or_else(|| LeaderError::NotFound(format!("worker {unit:?}")))?;
    Ok(Json(serde_json::to_value(row).unwrap_or(Value::Null)))
}

pub async fn remove(State(state): State<AppState>, Path(unit): Path<String>) -> Result<Json<Value>, LeaderError> {
    let deleted = workers::delete(&state.store, &unit).await?;
    if !deleted {
        return Err(LeaderError::NotFound(format!("worker {unit:?}")));
    }
    Ok(Json(json!({ "pioreactor_unit": unit })))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

pub async fn set_active(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<Value>, LeaderError> {
    let updated = workers::set_active(&state.store, &unit, req.is_active).await?;
    if !updated {
        return Err(LeaderError::NotFound(format!("worker {unit:?}")));
    }
    if !req.is_active {
        state.orchestrator.unassign_worker(&unit).await?;
    }
    Ok(Json(json!({ "pioreactor_unit": unit, "is_active": req.is_active })))
}

#[derive(Debug, Deserialize)]
pub struct SetModelRequest {
    pub model_name: Option<String>,
    pub model_version: Option<String>,
}

pub async fn set_model(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Json(req): Json<SetModelRequest>,
) -> Result<Json<Value>, LeaderError> {
    let updated = workers::update_model(&state.store, &unit, req.model_name.as_deref(), req.model_version.as_deref()).await?;
    if !updated {
        return Err(LeaderError::NotFound(format!("worker {unit:?}")));
    }
    Ok(Json(json!({ "pioreactor_unit": unit })))
}

pub async fn assignment(State(state): State<AppState>, Path(unit): Path<String>) -> Result<Json<Value>, LeaderError> {
    let current = assignments::current(&state.store, &unit).await?;
    Ok(Json(json!({ "assignment": current.map(|a| json!({ "experiment": a.experiment, "assigned_at": a.assigned_at })) })))
}

pub async fn assignment_history(State(state): State<AppState>, Path(unit): Path<String>) -> Result<Json<Value>, LeaderError> {
    let history = assignments::history_for_unit(&state.store, &unit).await?;
    Ok(Json(json!({ "history": history })))
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub experiment: String,
}

pub async fn assign(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Value>, LeaderError> {
    state.orchestrator.assign_worker(&unit, &req.experiment).await?;
    Ok(Json(json!({ "pioreactor_unit": unit, "experiment": req.experiment })))
}

pub async fn unassign(State(state): State<AppState>, Path(unit): Path<String>) -> Result<Json<Value>, LeaderError> {
    state.orchestrator.unassign_worker(&unit).await?;
    Ok(Json(json!({ "pioreactor_unit": unit })))
}
