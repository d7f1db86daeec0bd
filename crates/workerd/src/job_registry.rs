// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory bookkeeping of jobs believed to be running on this unit
//! (spec §4.6 `GET /jobs/running[...]`). Per-job control algorithms and
//! actual process supervision are out of scope (spec §1); this registry
//! only tracks what `/jobs/run` and `/jobs/stop` have been told, plus
//! whatever the worker's own job-state transitions report.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunningJob {
    pub job_name: String,
    pub experiment: String,
    pub is_long_running_job: bool,
    pub job_source: String,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<String, RunningJob>,
}

/// Keyed by `job_name` — the registry models one live instance per job
/// name per unit, matching how `/jobs/running/<job_name>` is addressed.
#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, job_name: &str, experiment: &str, job_source: &str, is_long_running_job: bool) {
        self.inner.lock().jobs.insert(
            job_name.to_string(),
            RunningJob {
                job_name: job_name.to_string(),
                experiment: experiment.to_string(),
                is_long_running_job,
                job_source: job_source.to_string(),
            },
        );
    }

    pub fn stop(&self, job_name: &str) -> bool {
        self.inner.lock().jobs.remove(job_name).is_some()
    }

    /// Stops every job matching the given filters. An empty filter
    /// clears everything (`/jobs/stop/all`).
    pub fn stop_matching(&self, job_name: Option<&str>, experiment: Option<&str>, job_source: Option<&str>) -> usize {
        let mut inner = self.inner.lock();
        let matching: Vec<String> = inner
            .jobs
            .values()
            .filter(|j| job_name.map_or(true, |n| j.job_name == n))
            .filter(|j| experiment.map_or(true, |e| j.experiment == e))
            .filter(|j| job_source.map_or(true, |s| j.job_source == s))
            .map(|j| j.job_name.clone())
            .collect();
        for name in &matching {
            inner.jobs.remove(name);
        }
        matching.len()
    }

    pub fn stop_all(&self) -> usize {
        let mut inner = self.inner.lock();
        let count = inner.jobs.len();
        inner.jobs.clear();
        count
    }

    pub fn get(&self, job_name: &str) -> Option<RunningJob> {
        self.inner.lock().jobs.get(job_name).cloned()
    }

    pub fn all(&self) -> Vec<RunningJob> {
        self.inner.lock().jobs.values().cloned().collect()
    }

    pub fn for_experiment(&self, experiment: &str) -> Vec<RunningJob> {
        self.inner.lock().jobs.values().filter(|j| j.experiment == experiment).cloned().collect()
    }

    pub fn long_running(&self) -> Vec<RunningJob> {
        self.inner.lock().jobs.values().filter(|j| j.is_long_running_job).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_get_round_trips() {
        let registry = JobRegistry::new();
        registry.start("stirring", "exp1", "user", true);
        let job = registry.get("stirring").unwrap();
        assert_eq!(job.experiment, "exp1");
        assert!(job.is_long_running_job);
    }

    #[test]
    fn stop_removes_and_reports_presence() {
        let registry = JobRegistry::new();
        registry.start("stirring", "exp1", "user", true);
        assert!(registry.stop("stirring"));
        assert!(!registry.stop("stirring"));
        assert!(registry.get("stirring").is_none());
    }

    #[test]
    fn stop_matching_filters_by_experiment() {
        let registry = JobRegistry::new();
        registry.start("stirring", "exp1", "user", true);
        registry.start("od_reading", "exp2", "user", true);
        let stopped = registry.stop_matching(None, Some("exp1"), None);
        assert_eq!(stopped, 1);
        assert!(registry.get("stirring").is_none());
        assert!(registry.get("od_reading").is_some());
    }

    #[test]
    fn stop_all_clears_the_registry() {
        let registry = JobRegistry::new();
        registry.start("stirring", "exp1", "user", true);
        registry.start("od_reading", "exp1", "user", true);
        assert_eq!(registry.stop_all(), 2);
        assert!(registry.all().is_empty());
    }

    #[test]
    fn long_running_filters_correctly() {
        let registry = JobRegistry::new();
        registry.start("stirring", "exp1", "user", true);
        registry.start("led_flash", "exp1", "user", false);
        assert_eq!(registry.long_running().len(), 1);
    }
}
