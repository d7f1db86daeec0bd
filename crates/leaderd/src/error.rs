// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps `EngineError`/leaderd-local failures onto the uniform error
//! envelope and HTTP status (spec §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rc_engine::{EngineError, TargetError};
use rc_storage::StoreError;
use rc_wire::error::ErrorEnvelope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} is disabled")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("upstream worker error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for LeaderError {
    fn from(err: StoreError) -> Self {
        LeaderError::Internal(err.to_string())
    }
}

impl IntoResponse for LeaderError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            LeaderError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorEnvelope::new(400, msg.clone())),
            LeaderError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorEnvelope::new(403, msg.clone())),
            LeaderError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorEnvelope::new(404, msg.clone())),
            LeaderError::Conflict(msg) => (StatusCode::CONFLICT, ErrorEnvelope::new(409, msg.clone())),
            LeaderError::Upstream(msg) => {
                (StatusCode::BAD_GATEWAY, ErrorEnvelope::new(502, "upstream worker error").with_cause(msg.clone()))
            }
            LeaderError::Engine(engine_err) => return engine_error_response(engine_err),
            LeaderError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorEnvelope::new(500, "internal error").with_cause(msg.clone())),
        };
        (status, Json(envelope)).into_response()
    }
}

fn engine_error_response(err: &EngineError) -> Response {
    let (status, envelope) = match err {
        EngineError::Target(TargetError::EmptyExperimentExpansion(exp)) => (
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(400, format!("experiment {exp:?} has no active workers")),
        ),
        EngineError::Target(TargetError::EmptyResult) => {
            (StatusCode::BAD_REQUEST, ErrorEnvelope::new(400, "no units matched the requested targeting options"))
        }
        EngineError::UnknownWorker(unit) => (StatusCode::NOT_FOUND, ErrorEnvelope::new(404, format!("worker {unit:?} not found"))),
        EngineError::InactiveWorker(unit) => {
            (StatusCode::BAD_REQUEST, ErrorEnvelope::new(400, format!("worker {unit:?} is not active")))
        }
        EngineError::NotAssigned { unit, experiment } => (
            StatusCode::BAD_REQUEST,
            ErrorEnvelope::new(400, format!("worker {unit:?} is not assigned to experiment {experiment:?}")),
        ),
        EngineError::Locked { action, lock } => (
            StatusCode::ACCEPTED,
            ErrorEnvelope::new(202, format!("{action} is locked")).with_cause((*lock).to_string()),
        ),
        EngineError::UnknownTask(id) => (StatusCode::NOT_FOUND, ErrorEnvelope::new(404, format!("task {id:?} not found"))),
        EngineError::Adapters(adapters_err) => {
            let status = adapters_err.upstream_status().unwrap_or(502);
            (StatusCode::BAD_GATEWAY, ErrorEnvelope::new(status, "upstream worker error").with_cause(adapters_err.to_string()))
        }
        EngineError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorEnvelope::new(400, msg.clone())),
        EngineError::Store(store_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new(500, "internal error").with_cause(store_err.to_string()),
        ),
        EngineError::Bus(bus_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorEnvelope::new(500, "bus publish failed").with_cause(bus_err.to_string()),
        ),
    };
    (status, Json(envelope)).into_response()
}
