// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/experiments/<exp>/time_series/<metric>` (spec §4.7, invariant 5).

use crate::error::LeaderError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Duration;
use rc_storage::timeseries::{self, Metric, TimeSeriesError};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct TimeSeriesQuery {
    #[serde(default = "default_lookback_hours")]
    lookback_hours: i64,
    #[serde(default = "default_target_points")]
    target_points: u32,
}

fn default_lookback_hours() -> i64 {
    4
}

fn default_target_points() -> u32 {
    720
}

pub async fn get(
    State(state): State<AppState>,
    Path((experiment, metric_name)): Path<(String, String)>,
    Query(query): Query<TimeSeriesQuery>,
) -> Result<Json<Value>, LeaderError> {
    let metric = Metric::from_name(&metric_name).ok_or_else(|| LeaderError::NotFound(format!("metric {metric_name:?}")))?;
    let series = timeseries::query(
        &state.store,
        &experiment,
        metric,
        Duration::hours(query.lookback_hours),
        query.target_points,
    )
    .await
    .map_err(|err| match err {
        TimeSeriesError::TargetPointsZero => LeaderError::Validation(err.to_string()),
        TimeSeriesError::Store(store_err) => LeaderError::from(store_err),
    })?;
    Ok(Json(serde_json::to_value(series).unwrap_or(Value::Null)))
}
