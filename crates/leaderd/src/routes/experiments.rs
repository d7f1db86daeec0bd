// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/experiments/...` (spec §4.7): experiment CRUD.

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rc_core::validate_experiment_name;
use rc_storage::{assignments, experiments};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, LeaderError> {
    let rows = experiments::list(&state.store).await?;
    Ok(Json(json!({ "experiments": rows })))
}

#[derive(Debug, Deserialize)]
pub struct CreateExperimentRequest {
    pub experiment: String,
    pub description: Option<String>,
    pub media_used: Option<String>,
    pub organism_used: Option<String>,
}

pub async fn create(State(state): State<AppState>, Json(req): Json<CreateExperimentRequest>) -> Result<Json<Value>, LeaderError> {
    validate_experiment_name(&req.experiment).map_err(|e| LeaderError::Validation(e.to_string()))?;
    let created = experiments::insert(
        &state.store,
        &req.experiment,
        req.description.as_deref(),
        req.media_used.as_deref(),
        req.organism_used.as_deref(),
        Utc::now(),
    )
    .await?;
    if !created {
        return Err(LeaderError::Conflict(format!("experiment {:?}", req.experiment)));
    }
    Ok(Json(json!({ "experiment": req.experiment })))
}

pub async fn get(State(state): State<AppState>, Path(experiment): Path<String>) -> Result<Json<Value>, LeaderError> {
    let row =
        experiments::get(&state.store, &experiment).await?.ok_or_else(|| LeaderError::NotFound(format!("experiment {experiment:?}")))?;
    Ok(Json(serde_json::to_value(row).unwrap_or(Value::Null)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateExperimentRequest {
    pub description: Option<String>,
    pub media_used: Option<String>,
    pub organism_used: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    Path(experiment): Path<String>,
    Json(req): Json<UpdateExperimentRequest>,
) -> Result<Json<Value>, LeaderError> {
    let updated = experiments::update(
        &state.store,
        &experiment,
        req.description.as_deref(),
        req.media_used.as_deref(),
        req.organism_used.as_deref(),
    )
    .await?;
    if !updated {
        return Err(LeaderError::NotFound(format!("experiment {experiment:?}")));
    }
    Ok(Json(json!({ "experiment": experiment })))
}

pub async fn delete(State(state): State<AppState>, Path(experiment): Path<String>) -> Result<Json<Value>, LeaderError> {
    let deleted = state.orchestrator.delete_experiment(&experiment).await?;
    if !deleted {
        return Err(LeaderError::NotFound(format!("experiment {experiment:?}")));
    }
    Ok(Json(json!({ "experiment": experiment })))
}

pub async fn assignment_count(State(state): State<AppState>, Path(experiment): Path<String>) -> Result<Json<Value>, LeaderError> {
    let count = assignments::count_for_experiment(&state.store, &experiment).await?;
    Ok(Json(json!({ "experiment": experiment, "count": count })))
}

pub async fn assigned_workers(State(state): State<AppState>, Path(experiment): Path<String>) -> Result<Json<Value>, LeaderError> {
    let rows = assignments::list_for_experiment(&state.store, &experiment).await?;
    Ok(Json(json!({ "assignments": rows.into_iter().map(|a| json!({
        "pioreactor_unit": a.pioreactor_unit,
        "assigned_at": a.assigned_at,
    })).collect::<Vec<_>>() })))
}

pub async fn historical_organisms(State(state): State<AppState>) -> Result<Json<Value>, LeaderError> {
    Ok(Json(json!({ "organisms": experiments::historical_organisms(&state.store).await? })))
}

pub async fn historical_media(State(state): State<AppState>) -> Result<Json<Value>, LeaderError> {
    Ok(Json(json!({ "media": experiments::historical_media(&state.store).await? })))
}
