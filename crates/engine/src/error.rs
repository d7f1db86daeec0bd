// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Why `Targeter::resolve` could not produce a unit set (spec §4.7 step 1/6).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("experiment {0:?} has no active workers assigned")]
    EmptyExperimentExpansion(String),
    #[error("no units matched the requested targeting options")]
    EmptyResult,
}

/// Errors surfaced by `Orchestrator` methods, independent of how
/// `rc-leaderd` turns them into an HTTP response (that mapping lives in
/// `rc-leaderd::error`, which matches on these variants).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Store(#[from] rc_storage::StoreError),
    #[error(transparent)]
    Bus(#[from] rc_bus::BusError),
    #[error("worker {0:?} is not in the inventory")]
    UnknownWorker(String),
    #[error("worker {0:?} is not active")]
    InactiveWorker(String),
    #[error("worker {unit:?} is not assigned to experiment {experiment:?}")]
    NotAssigned { unit: String, experiment: String },
    #[error("{action} is locked by a running task holding {lock:?}")]
    Locked { action: String, lock: &'static str },
    #[error("task {0:?} not found")]
    UnknownTask(String),
    #[error(transparent)]
    Adapters(#[from] rc_adapters::AdaptersError),
    #[error("validation failed: {0}")]
    Validation(String),
}
