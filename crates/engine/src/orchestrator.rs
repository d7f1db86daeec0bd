// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties `Store`, `Bus`, `Multicaster`, and `TaskQueue` together behind
//! one method per `LeaderAPI` mutation endpoint (spec §4.8). `rc-leaderd`
//! handlers are thin HTTP-request-to-Orchestrator-call translations,
//! matching the teacher's separation between I/O-facing listener code
//! and the engine that makes decisions.

use crate::error::EngineError;
use crate::targeter::{InventoryUnit, Targeter};
use crate::task_queue::{NamedLock, SpawnOutcome, TaskQueue};
use chrono::Utc;
use rc_adapters::{Method as UnitMethod, Multicaster, Payload, UnitOutcome};
use rc_bus::{publish_json_confirm, state_set, Bus};
use rc_core::UnitId;
use rc_storage::{assignments, workers, Store};
use rc_wire::run_job::RunJobPayload;
use rc_wire::targeting::TargetQuery;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Orchestrator {
    store: Store,
    bus: Arc<dyn Bus>,
    multicaster: Arc<Multicaster>,
    tasks: TaskQueue,
    leader_unit: UnitId,
}

impl Orchestrator {
    pub fn new(store: Store, bus: Arc<dyn Bus>, multicaster: Arc<Multicaster>, tasks: TaskQueue, leader_unit: UnitId) -> Self {
        Self { store, bus, multicaster, tasks, leader_unit }
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    /// Loads the inventory+assignment snapshot and resolves `query`
    /// against it (spec §4.7 Targeter).
    pub async fn resolve_targets(&self, query: &TargetQuery) -> Result<Vec<UnitId>, EngineError> {
        let all_workers = workers::list(&self.store).await?;
        let current_assignments = assignments::list_all(&self.store).await?;
        let assigned: HashMap<String, String> =
            current_assignments.into_iter().map(|a| (a.pioreactor_unit, a.experiment)).collect();

        let inventory: Vec<InventoryUnit> = all_workers
            .into_iter()
            .map(|w| InventoryUnit {
                unit: UnitId::new(w.pioreactor_unit.clone()),
                is_active: w.is_active,
                assigned_experiment: assigned.get(&w.pioreactor_unit).cloned(),
            })
            .collect();

        Ok(Targeter::resolve(query, &inventory, &self.leader_unit)?)
    }

    /// `POST /workers/<u>/jobs/run/job_name/<job>/experiments/<exp>`
    /// (spec §4.7): validates assignment, builds the worker's env, and
    /// fans a single-unit run out through the `TaskQueue`. When `unit`
    /// is the universal identifier, dispatches to [`Self::run_job_broadcast`]
    /// instead (SPEC_FULL §9 Open Questions: `$broadcast` + an explicit
    /// experiment targets every worker currently assigned to it;
    /// `$broadcast` + `$experiment` targets every active worker,
    /// tagged with the target experiment rather than each worker's own).
    pub async fn run_job(
        &self,
        unit: &str,
        experiment: &str,
        job: &str,
        payload: RunJobPayload,
    ) -> Result<SpawnOutcome, EngineError> {
        if rc_core::is_universal_unit(unit) {
            return self.run_job_broadcast(experiment, job, payload).await;
        }
        self.run_job_single(unit, experiment, job, payload).await
    }

    async fn run_job_single(
        &self,
        unit: &str,
        experiment: &str,
        job: &str,
        mut payload: RunJobPayload,
    ) -> Result<SpawnOutcome, EngineError> {
        let worker = workers::get(&self.store, unit).await?.ok_or_else(|| EngineError::UnknownWorker(unit.to_string()))?;
        if !worker.is_active {
            return Err(EngineError::InactiveWorker(unit.to_string()));
        }
        if !rc_core::is_universal_experiment(experiment) {
            let current = assignments::current(&self.store, unit).await?;
            if current.as_ref().map(|a| a.experiment.as_str()) != Some(experiment) {
                return Err(EngineError::NotAssigned { unit: unit.to_string(), experiment: experiment.to_string() });
            }
        }

        payload = payload.with_standard_env(
            experiment,
            unit,
            worker.is_active,
            worker.model_name.as_deref(),
            worker.model_version.as_deref(),
        );

        let multicaster = self.multicaster.clone();
        let unit_owned = unit.to_string();
        let job_owned = job.to_string();
        let json_payload = serde_json::to_value(&payload).unwrap_or(Value::Null);

        let outcome = self.tasks.spawn(None, async move {
            let path = format!("/unit_api/jobs/run/job_name/{job_owned}");
            let result = multicaster
                .multicast(UnitMethod::Post, &path, &[unit_owned.clone()], Payload::Shared(json_payload), Duration::from_secs(30), false)
                .await;
            aggregate_single(&unit_owned, result)
        });
        Ok(outcome)
    }

    /// Resolves the broadcast targets for a `$broadcast` run and fans
    /// the (per-unit-enveloped) payload out in a single `Task`.
    async fn run_job_broadcast(
        &self,
        experiment: &str,
        job: &str,
        payload: RunJobPayload,
    ) -> Result<SpawnOutcome, EngineError> {
        let all_workers = workers::list(&self.store).await?;
        let targets: Vec<rc_storage::workers::WorkerRow> = if rc_core::is_universal_experiment(experiment) {
            all_workers.into_iter().filter(|w| w.is_active).collect()
        } else {
            let current_assignments = assignments::list_all(&self.store).await?;
            let assigned: std::collections::HashSet<String> = current_assignments
                .into_iter()
                .filter(|a| a.experiment == experiment)
                .map(|a| a.pioreactor_unit)
                .collect();
            let matched: Vec<_> = all_workers.into_iter().filter(|w| w.is_active && assigned.contains(&w.pioreactor_unit)).collect();
            if matched.is_empty() {
                return Err(EngineError::Target(crate::error::TargetError::EmptyExperimentExpansion(experiment.to_string())));
            }
            matched
        };

        let unit_names: Vec<String> = targets.iter().map(|w| w.pioreactor_unit.clone()).collect();
        let payloads: Vec<Value> = targets
            .iter()
            .map(|w| {
                let unit_payload = payload.clone().with_standard_env(
                    experiment,
                    &w.pioreactor_unit,
                    w.is_active,
                    w.model_name.as_deref(),
                    w.model_version.as_deref(),
                );
                serde_json::to_value(&unit_payload).unwrap_or(Value::Null)
            })
            .collect();

        let multicaster = self.multicaster.clone();
        let job_owned = job.to_string();
        let outcome = self.tasks.spawn(None, async move {
            let path = format!("/unit_api/jobs/run/job_name/{job_owned}");
            let result = multicaster
                .multicast(UnitMethod::Post, &path, &unit_names, Payload::PerUnit(payloads), Duration::from_secs(30), false)
                .await;
            Ok(aggregate_map(result))
        });
        Ok(outcome)
    }

    /// `PATCH /workers/<u>/jobs/update/job_name/<job>/experiments/<exp>`:
    /// translates `{settings}` into one Bus publish per key (spec §4.7).
    /// PATCH never goes through the `Multicaster`/WorkerAPI — it's a
    /// Bus-only command per SPEC_FULL §9 Open Questions.
    pub async fn update_job_settings(
        &self,
        unit: &str,
        experiment: &str,
        job: &str,
        settings: &indexmap::IndexMap<String, Value>,
    ) -> Result<(), EngineError> {
        for (setting, value) in settings {
            let topic = rc_bus::setting_set(unit, experiment, job, setting);
            publish_json_confirm(self.bus.as_ref(), &topic, value).await?;
        }
        Ok(())
    }

    /// `POST /workers/<u>/jobs/stop/job_name/<job>/experiments/<exp>`:
    /// Bus `$state/set disconnected`, falling back to a direct
    /// WorkerAPI call if the publish isn't confirmed (spec §4.7).
    pub async fn stop_job(&self, unit: &str, experiment: &str, job: &str) -> Result<(), EngineError> {
        if rc_core::is_universal_unit(unit) {
            return self.stop_job_broadcast(experiment, job).await;
        }
        self.stop_job_on(unit, experiment, job).await
    }

    /// Bus `$state/set disconnected` for one unit, falling back to a
    /// direct WorkerAPI call if the publish isn't confirmed (spec §4.7).
    async fn stop_job_on(&self, unit: &str, experiment: &str, job: &str) -> Result<(), EngineError> {
        let topic = state_set(unit, experiment, job);
        let publish_result =
            self.bus.publish_confirm(&topic, br#""disconnected""#, rc_bus::DEFAULT_PUBLISH_CONFIRM_TIMEOUT).await;

        if publish_result.is_ok() {
            return Ok(());
        }

        let body = json!({"job_name": job});
        let result = self
            .multicaster
            .multicast(UnitMethod::Post, "/unit_api/jobs/stop", &[unit.to_string()], Payload::Shared(body), Duration::from_secs(30), false)
            .await;
        match result.get(unit) {
            Some(Some(outcome)) if outcome.ok => Ok(()),
            _ => Err(EngineError::Adapters(rc_adapters::AdaptersError::Timeout {
                unit: unit.to_string(),
                timeout: rc_bus::DEFAULT_PUBLISH_CONFIRM_TIMEOUT,
            })),
        }
    }

    /// `$broadcast` stop (SPEC_FULL §9 Open Questions): resolves the
    /// same target set `run_job_broadcast` would use and stops each
    /// concurrently. Per-unit failures don't fail the whole call — the
    /// caller gets an error only if every target failed.
    async fn stop_job_broadcast(&self, experiment: &str, job: &str) -> Result<(), EngineError> {
        let all_workers = workers::list(&self.store).await?;
        let unit_names: Vec<String> = if rc_core::is_universal_experiment(experiment) {
            all_workers.into_iter().filter(|w| w.is_active).map(|w| w.pioreactor_unit).collect()
        } else {
            let current_assignments = assignments::list_all(&self.store).await?;
            let assigned: std::collections::HashSet<String> = current_assignments
                .into_iter()
                .filter(|a| a.experiment == experiment)
                .map(|a| a.pioreactor_unit)
                .collect();
            all_workers.into_iter().filter(|w| w.is_active && assigned.contains(&w.pioreactor_unit)).map(|w| w.pioreactor_unit).collect()
        };
        if unit_names.is_empty() {
            return Err(EngineError::Target(crate::error::TargetError::EmptyExperimentExpansion(experiment.to_string())));
        }

        let mut results = futures_util::future::join_all(unit_names.iter().map(|unit| self.stop_job_on(unit, experiment, job))).await;
        if results.iter().any(Result::is_ok) {
            return Ok(());
        }
        results.pop().unwrap_or(Err(EngineError::Target(crate::error::TargetError::EmptyResult)))
    }

    /// `POST /workers/<u>/jobs/stop_all` (spec §6 `pios kill --all-jobs`):
    /// passes straight through to WorkerAPI `/jobs/stop/all` since there
    /// is no per-job Bus topic for "every job" — bypasses the Bus the
    /// same way `schedule_config_sync` bypasses it for config pushes.
    /// `$broadcast` stops every active worker; a named unit stops just
    /// that one.
    pub async fn stop_all_jobs(&self, unit: &str) -> Result<SpawnOutcome, EngineError> {
        let targets: Vec<String> = if rc_core::is_universal_unit(unit) {
            workers::list(&self.store).await?.into_iter().filter(|w| w.is_active).map(|w| w.pioreactor_unit).collect()
        } else {
            workers::get(&self.store, unit).await?.ok_or_else(|| EngineError::UnknownWorker(unit.to_string()))?;
            vec![unit.to_string()]
        };
        if targets.is_empty() {
            return Err(EngineError::Target(crate::error::TargetError::EmptyResult));
        }

        let multicaster = self.multicaster.clone();
        let outcome = self.tasks.spawn(None, async move {
            let result =
                multicaster.multicast(UnitMethod::Post, "/unit_api/jobs/stop/all", &targets, Payload::None, Duration::from_secs(30), false).await;
            Ok(aggregate_map(result))
        });
        Ok(outcome)
    }

    /// Deletes an experiment and cascades its assignment rows (spec §3
    /// invariant 2), then kicks off best-effort space reclamation.
    pub async fn delete_experiment(&self, experiment: &str) -> Result<bool, EngineError> {
        let now = Utc::now();
        assignments::delete_for_experiment(&self.store, experiment, now).await?;
        let deleted = rc_storage::experiments::delete(&self.store, experiment).await?;
        if deleted {
            self.store.reclaim_space_in_background();
        }
        Ok(deleted)
    }

    /// Assigns `unit` to `experiment`, after confirming both exist and
    /// the worker is active (spec §3, §4.8: "the only place where
    /// assignment/active checks are enforced for mutation requests").
    pub async fn assign_worker(&self, unit: &str, experiment: &str) -> Result<(), EngineError> {
        let worker = workers::get(&self.store, unit).await?.ok_or_else(|| EngineError::UnknownWorker(unit.to_string()))?;
        if !worker.is_active {
            return Err(EngineError::InactiveWorker(unit.to_string()));
        }
        assignments::assign(&self.store, unit, experiment, Utc::now()).await?;
        Ok(())
    }

    pub async fn unassign_worker(&self, unit: &str) -> Result<(), EngineError> {
        assignments::unassign(&self.store, unit, Utc::now()).await?;
        Ok(())
    }

    /// Generic single-path fan-out for actions with no dedicated Bus
    /// topic (spec §4.6 supplement: power, update, plugin install):
    /// resolves `unit` the same way `run_job`/`stop_job` do
    /// (`$broadcast` => every active worker) and posts `path` to each
    /// target under `lock`.
    pub async fn forward_to_units(
        &self,
        unit: &str,
        path: &str,
        payload: Payload,
        lock: Option<NamedLock>,
    ) -> Result<SpawnOutcome, EngineError> {
        let targets: Vec<String> = if rc_core::is_universal_unit(unit) {
            workers::list(&self.store).await?.into_iter().filter(|w| w.is_active).map(|w| w.pioreactor_unit).collect()
        } else {
            workers::get(&self.store, unit).await?.ok_or_else(|| EngineError::UnknownWorker(unit.to_string()))?;
            vec![unit.to_string()]
        };
        if targets.is_empty() {
            return Err(EngineError::Target(crate::error::TargetError::EmptyResult));
        }

        let multicaster = self.multicaster.clone();
        let path = path.to_string();
        let outcome = self.tasks.spawn(lock, async move {
            let result = multicaster.multicast(UnitMethod::Post, &path, &targets, payload, Duration::from_secs(30), false).await;
            Ok(aggregate_map(result))
        });
        Ok(outcome)
    }

    /// Schedules a config-sync task under `update-lock`: pushes the
    /// rendered `filename` contents to every target unit's WorkerAPI
    /// (spec §4.7 `PATCH /configs/<filename>`).
    pub fn schedule_config_sync(&self, targets: Vec<String>, filename: String, rendered_ini: String) -> SpawnOutcome {
        let multicaster = self.multicaster.clone();
        self.tasks.spawn(Some(NamedLock::Update), async move {
            let path = format!("/unit_api/configs/{filename}");
            let payload = Payload::Shared(json!({"content": rendered_ini}));
            let result = multicaster.multicast(UnitMethod::Post, &path, &targets, payload, Duration::from_secs(30), false).await;
            let ok_count = result.values().filter(|v| v.as_ref().is_some_and(|o| o.ok)).count();
            Ok(json!({"synced": ok_count, "targeted": targets.len()}))
        })
    }
}

fn aggregate_single(unit: &str, mut result: HashMap<String, Option<UnitOutcome>>) -> Result<Value, String> {
    match result.remove(unit).flatten() {
        Some(outcome) if outcome.ok => Ok(outcome.body.unwrap_or(Value::Null)),
        Some(outcome) => Err(outcome.error.unwrap_or_else(|| "worker returned an error".to_string())),
        None => Err(format!("no response from {unit}")),
    }
}

/// Folds a full multicast result into the task-result JSON shape used
/// by broadcast operations (spec §4.4: "partial success is not an
/// error" — per-unit outcomes surface in the completed task's result).
fn aggregate_map(result: HashMap<String, Option<UnitOutcome>>) -> Value {
    let per_unit: indexmap::IndexMap<String, Value> = result
        .into_iter()
        .map(|(unit, outcome)| {
            let value = match outcome {
                None => json!({ "ok": false, "error": "no response" }),
                Some(o) if o.ok => json!({ "ok": true, "body": o.body.unwrap_or(Value::Null) }),
                Some(o) => json!({ "ok": false, "error": o.error.unwrap_or_default() }),
            };
            (unit, value)
        })
        .collect();
    json!({ "units": per_unit })
}
