// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/experiments/<exp>/logs` and `/api/workers/<u>/logs` (spec §4.7).

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use rc_core::LogLevel;
use rc_storage::logs;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    min_level: Option<String>,
    #[serde(default)]
    skip: Option<i64>,
    #[serde(default)]
    limit: Option<i64>,
}

fn parsed(query: &LogQuery) -> Result<(LogLevel, i64, i64), LeaderError> {
    let min_level = match &query.min_level {
        Some(s) => LogLevel::from_str(s).map_err(LeaderError::Validation)?,
        None => LogLevel::Info,
    };
    Ok((min_level, query.skip.unwrap_or(0), query.limit.unwrap_or(1000)))
}

pub async fn for_experiment(
    State(state): State<AppState>,
    Path(experiment): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, LeaderError> {
    let (min_level, skip, limit) = parsed(&query)?;
    let rows = logs::recent_for_experiment(&state.store, &experiment, min_level, skip, limit).await?;
    Ok(Json(json!({ "logs": rows })))
}

pub async fn for_unit(
    State(state): State<AppState>,
    Path(unit): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Value>, LeaderError> {
    let (min_level, skip, limit) = parsed(&query)?;
    let rows = logs::recent_for_unit(&state.store, &unit, min_level, skip, limit).await?;
    Ok(Json(json!({ "logs": rows })))
}
