// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps worker-local failures onto the uniform error envelope and HTTP
//! status (spec §7), the same shape `rc-leaderd::error` uses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rc_storage::StoreError;
use rc_wire::error::ErrorEnvelope;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} is disabled")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{action} is locked")]
    Locked { action: String, lock: &'static str },
    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("not implemented")]
    NotImplemented,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for WorkerError {
    fn from(err: StoreError) -> Self {
        WorkerError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for WorkerError {
    fn from(err: std::io::Error) -> Self {
        WorkerError::Internal(err.to_string())
    }
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            WorkerError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorEnvelope::new(400, msg.clone())),
            WorkerError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorEnvelope::new(403, msg.clone())),
            WorkerError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorEnvelope::new(404, msg.clone())),
            WorkerError::Conflict(msg) => (StatusCode::CONFLICT, ErrorEnvelope::new(409, msg.clone())),
            WorkerError::Locked { action, lock } => (
                StatusCode::ACCEPTED,
                ErrorEnvelope::new(202, format!("{action} is locked")).with_cause((*lock).to_string()),
            ),
            WorkerError::RateLimited { retry_after_ms } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorEnvelope::new(429, "job run rate limit exceeded").with_remediation(format!("retry after {retry_after_ms}ms")),
            ),
            WorkerError::NotImplemented => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorEnvelope::new(503, "direct settings PATCH is not implemented")
                    .with_remediation("publish the setting over the control bus instead"),
            ),
            WorkerError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorEnvelope::new(500, "internal error").with_cause(msg.clone()))
            }
        };
        (status, Json(envelope)).into_response()
    }
}
