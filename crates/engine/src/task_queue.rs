// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-process background task executor with named locks (spec
//! §4.5). Tasks run as ordinary `tokio::spawn`ed futures; `TaskQueue`
//! only tracks state and result for polling and enforces the named-lock
//! contract before a task is allowed to start.

use parking_lot::Mutex;
use rc_core::{TaskId, TaskState};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Locks named in spec §4.5. Only one task may hold a given lock at a
/// time; a second attempt returns `locked` synchronously instead of
/// queueing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedLock {
    Update,
    Power,
    Clock,
    WebRestart,
    ImportDotPioreactor,
}

impl NamedLock {
    pub fn as_str(self) -> &'static str {
        match self {
            NamedLock::Update => "update-lock",
            NamedLock::Power => "power-lock",
            NamedLock::Clock => "clock-lock",
            NamedLock::WebRestart => "web-restart-lock",
            NamedLock::ImportDotPioreactor => "import-dot-pioreactor-lock",
        }
    }
}

/// Results are retained this long after completion before eviction, to
/// bound memory on a long-running leader process (ambient addition,
/// SPEC_FULL §4.5 — not stated in the distilled spec).
const RESULT_RETENTION: Duration = Duration::from_secs(15 * 60);

struct Entry {
    state: TaskState,
    result: Option<Value>,
    error: Option<String>,
    lock: Option<NamedLock>,
    /// Set once the task reaches a terminal state; eviction measures
    /// idleness from here.
    completed_at: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub state: TaskState,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub lock: Option<&'static str>,
}

/// Outcome of attempting to start a task under an optional named lock.
pub enum SpawnOutcome {
    Started(TaskId),
    Locked { task_id: TaskId, lock: &'static str },
}

#[derive(Default)]
struct Inner {
    entries: HashMap<TaskId, Entry>,
    held_locks: HashMap<NamedLock, TaskId>,
}

#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Mutex<Inner>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::default())) }
    }

    /// Starts `work` as a background task, optionally under `lock`. If
    /// `lock` is already held, returns `Locked` synchronously without
    /// spawning anything (spec §4.5: "Attempting to start a second task
    /// under a held lock returns synchronously with state=locked").
    pub fn spawn<F>(&self, lock: Option<NamedLock>, work: F) -> SpawnOutcome
    where
        F: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let task_id = TaskId::new();
        {
            let mut inner = self.inner.lock();
            if let Some(lock) = lock {
                if inner.held_locks.contains_key(&lock) {
                    return SpawnOutcome::Locked { task_id, lock: lock.as_str() };
                }
                inner.held_locks.insert(lock, task_id.clone());
            }
            inner.entries.insert(
                task_id.clone(),
                Entry { state: TaskState::InProgress, result: None, error: None, lock, completed_at: None },
            );
        }

        let queue = self.clone();
        let spawned_id = task_id.clone();
        tokio::spawn(async move {
            let outcome = work.await;
            queue.finish(&spawned_id, outcome);
        });

        SpawnOutcome::Started(task_id)
    }

    fn finish(&self, task_id: &TaskId, outcome: Result<Value, String>) {
        let mut inner = self.inner.lock();
        let lock = inner.entries.get(task_id).and_then(|e| e.lock);
        if let Some(lock) = lock {
            inner.held_locks.remove(&lock);
        }
        if let Some(entry) = inner.entries.get_mut(task_id) {
            entry.completed_at = Some(Instant::now());
            match outcome {
                Ok(result) => {
                    entry.state = TaskState::Complete;
                    entry.result = Some(result);
                }
                Err(error) => {
                    entry.state = TaskState::Failed;
                    entry.error = Some(error);
                }
            }
        }
    }

    pub fn get(&self, task_id: &TaskId) -> Option<TaskSnapshot> {
        let inner = self.inner.lock();
        inner.entries.get(task_id).map(|e| TaskSnapshot {
            state: e.state,
            result: e.result.clone(),
            error: e.error.clone(),
            lock: e.lock.map(NamedLock::as_str),
        })
    }

    /// Drops entries that finished more than `RESULT_RETENTION` ago.
    /// Called periodically by `run_eviction_loop`; exposed separately so
    /// tests can drive it without waiting on a real clock.
    pub fn evict_stale(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let stale: Vec<TaskId> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.completed_at.is_some_and(|at| now.duration_since(at) > RESULT_RETENTION))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            inner.entries.remove(id);
        }
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "evicted stale task results");
        }
    }

    /// Spawns the background eviction loop. Call once per process.
    pub fn run_eviction_loop(&self) {
        let queue = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                queue.evict_stale();
            }
        });
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn a_task_transitions_from_in_progress_to_complete() {
        let queue = TaskQueue::new();
        let outcome = queue.spawn(None, async { Ok(json!({"n": 1})) });
        let task_id = match outcome {
            SpawnOutcome::Started(id) => id,
            SpawnOutcome::Locked { .. } => panic!("expected Started"),
        };
        assert_eq!(queue.get(&task_id).unwrap().state, TaskState::InProgress);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let snapshot = queue.get(&task_id).unwrap();
        assert_eq!(snapshot.state, TaskState::Complete);
        assert_eq!(snapshot.result, Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn a_failing_task_transitions_to_failed() {
        let queue = TaskQueue::new();
        let outcome = queue.spawn(None, async { Err("boom".to_string()) });
        let task_id = match outcome {
            SpawnOutcome::Started(id) => id,
            SpawnOutcome::Locked { .. } => panic!("expected Started"),
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let snapshot = queue.get(&task_id).unwrap();
        assert_eq!(snapshot.state, TaskState::Failed);
        assert_eq!(snapshot.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn a_second_task_under_a_held_lock_is_rejected_synchronously() {
        let queue = TaskQueue::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        queue.spawn(Some(NamedLock::Update), async move {
            let _ = rx.await;
            Ok(json!(null))
        });

        let second = queue.spawn(Some(NamedLock::Update), async { Ok(json!(null)) });
        match second {
            SpawnOutcome::Locked { lock, .. } => assert_eq!(lock, "update-lock"),
            SpawnOutcome::Started(_) => panic!("expected Locked"),
        }

        let _ = tx.send(());
    }

    #[tokio::test]
    async fn releasing_a_lock_allows_the_next_task_to_start() {
        let queue = TaskQueue::new();
        let first = queue.spawn(Some(NamedLock::Clock), async { Ok(json!(null)) });
        assert!(matches!(first, SpawnOutcome::Started(_)));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = queue.spawn(Some(NamedLock::Clock), async { Ok(json!(null)) });
        assert!(matches!(second, SpawnOutcome::Started(_)));
    }

    #[tokio::test]
    async fn unknown_task_id_returns_none() {
        let queue = TaskQueue::new();
        assert!(queue.get(&TaskId::new()).is_none());
    }
}
