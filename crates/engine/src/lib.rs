// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Decision-making core of the leader process: target resolution, the
//! background task queue, the worker-local job state machine, the
//! plugin registry, and the `Orchestrator` that ties them to `Store`/
//! `Bus`/`Multicaster` (spec §4.5, §4.7 Targeter, §4.8, §4.9).

mod error;
mod job_lifecycle;
mod orchestrator;
mod plugin_registry;
mod targeter;
mod task_queue;

pub use error::{EngineError, TargetError};
pub use job_lifecycle::{JobState, TransitionError};
pub use orchestrator::Orchestrator;
pub use plugin_registry::{
    sentinel_present, ContribSpec, PluginError, PluginManifest, PluginRegistry, RouteMethod, RouteSpec,
    DISALLOW_UI_FILE_SYSTEM, DISALLOW_UI_INSTALLS,
};
pub use targeter::{InventoryUnit, Targeter};
pub use task_queue::{NamedLock, SpawnOutcome, TaskQueue, TaskSnapshot};
