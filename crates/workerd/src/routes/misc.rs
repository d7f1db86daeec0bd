// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small stateless status endpoints (spec §4.6): health, app version,
//! declared capabilities, and the static calibration-protocol registry.

use axum::extract::State;
use axum::Json;
use crate::state::AppState;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn app_version() -> Json<Value> {
    Json(json!({ "version": env!("CARGO_PKG_VERSION") }))
}

pub async fn capabilities(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "unit": state.config.unit,
        "plugins": state.plugins.manifests().iter().map(|p| &p.name).collect::<Vec<_>>(),
        "model_name": state.config.model_name,
        "model_version": state.config.model_version,
    }))
}

/// Calibration protocols this build knows how to run, compiled in
/// rather than discovered at runtime — there is no equivalent of the
/// source's dynamic Python protocol import (REDESIGN FLAGS).
pub async fn calibration_protocols() -> Json<Value> {
    Json(json!({
        "protocols": [
            { "device": "od", "protocol": "od_600_calibration" },
            { "device": "temperature", "protocol": "temperature_calibration" },
            { "device": "stirring", "protocol": "stirring_calibration" },
        ]
    }))
}
