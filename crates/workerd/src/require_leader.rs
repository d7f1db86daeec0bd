// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport-level "only the leader may call this" enforcement (spec
//! §4.6). Checks the caller's socket peer address against the
//! configured leader hostname/loopback, the same shape as the source's
//! `require_leader` decorator but applied as an axum middleware instead
//! of wrapping each view function.

use crate::state::AppState;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rc_wire::error::ErrorEnvelope;
use std::net::SocketAddr;

pub async fn require_leader(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !state.config.is_leader_address(&addr.ip().to_string()) {
        let envelope = ErrorEnvelope::new(403, "this endpoint may only be called by the cluster leader");
        return (StatusCode::FORBIDDEN, Json(envelope)).into_response();
    }
    next.run(request).await
}
