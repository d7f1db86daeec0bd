// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised by [`crate::UnitClient`] (spec §4.3). No retries live
/// at this layer — a caller that wants retries does so at the
/// `Multicaster`/`Orchestrator` level.
#[derive(Debug, Error)]
pub enum AdaptersError {
    #[error("unit {0:?} could not be resolved to an address")]
    UnresolvedUnit(String),
    #[error("path {0:?} must start with /unit_api")]
    BadPath(String),
    #[error("request to {unit} timed out after {timeout:?}")]
    Timeout { unit: String, timeout: std::time::Duration },
    #[error("request to {unit} failed: {source}")]
    Transport { unit: String, #[source] source: reqwest::Error },
    #[error("{unit} responded with HTTP {status}: {body}")]
    Http { unit: String, status: u16, body: String },
}

impl AdaptersError {
    /// The HTTP status, if this error carries a worker-reported one,
    /// for leaderd's upstream-error mapping (spec §7: "Upstream").
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AdaptersError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
