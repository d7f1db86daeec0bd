// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the `Store`. Constraint violations are deliberately
/// *not* represented here — per the `modify` contract (spec §4.1) those
/// come back as `Ok(0)` affected rows, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(String),
    #[error("attempted to write through a query-only handle")]
    QueryOnlyViolation,
    #[error("local state io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("local state serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
