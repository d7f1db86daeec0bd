// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task-result envelope returned by every async endpoint and by
//! `GET /unit_api/task_results/<id>` (spec §6).

use rc_core::TaskId;
use serde::{Deserialize, Serialize};

/// Poll-facing status string. Distinct from [`rc_core::TaskState`]: the
/// envelope folds `Pending` into the same string the source used
/// ("pending or not present") since a missing task id and a pending one
/// are indistinguishable to a polling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[serde(rename = "pending or not present")]
    PendingOrNotPresent,
    InProgress,
    Complete,
    Failed,
}

impl From<rc_core::TaskState> for TaskStatus {
    fn from(state: rc_core::TaskState) -> Self {
        use rc_core::TaskState::*;
        match state {
            Pending | Locked => TaskStatus::PendingOrNotPresent,
            InProgress => TaskStatus::InProgress,
            Complete => TaskStatus::Complete,
            Failed => TaskStatus::Failed,
        }
    }
}

/// The envelope shape every async endpoint returns, and the body of
/// `GET .../task_results/<id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task_id: TaskId,
    pub result_url_path: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present only when `status` reflects a held named lock (§4.5).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<String>,
}

impl TaskEnvelope {
    fn new(task_id: TaskId, result_url_path_prefix: &str, status: TaskStatus) -> Self {
        Self {
            result_url_path: format!("{result_url_path_prefix}/{task_id}"),
            task_id,
            status,
            result: None,
            error: None,
            lock: None,
        }
    }

    pub fn pending(task_id: TaskId, result_url_path_prefix: &str) -> Self {
        Self::new(task_id, result_url_path_prefix, TaskStatus::PendingOrNotPresent)
    }

    pub fn in_progress(task_id: TaskId, result_url_path_prefix: &str) -> Self {
        Self::new(task_id, result_url_path_prefix, TaskStatus::InProgress)
    }

    pub fn locked(task_id: TaskId, result_url_path_prefix: &str, lock_name: impl Into<String>) -> Self {
        let mut env = Self::new(task_id, result_url_path_prefix, TaskStatus::InProgress);
        env.lock = Some(lock_name.into());
        env
    }

    pub fn complete(task_id: TaskId, result_url_path_prefix: &str, result: serde_json::Value) -> Self {
        let mut env = Self::new(task_id, result_url_path_prefix, TaskStatus::Complete);
        env.result = Some(result);
        env
    }

    pub fn failed(task_id: TaskId, result_url_path_prefix: &str, error: impl Into<String>) -> Self {
        let mut env = Self::new(task_id, result_url_path_prefix, TaskStatus::Failed);
        env.error = Some(error.into());
        env
    }

    /// HTTP status code this envelope maps to, per spec §4.5/§6.
    pub fn http_status(&self) -> u16 {
        match self.status {
            TaskStatus::Complete => 200,
            TaskStatus::Failed => 500,
            TaskStatus::PendingOrNotPresent | TaskStatus::InProgress => 202,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_maps_to_200() {
        let env = TaskEnvelope::complete(TaskId::new(), "/unit_api/task_results", serde_json::json!({"ok": true}));
        assert_eq!(env.http_status(), 200);
        assert_eq!(env.status, TaskStatus::Complete);
    }

    #[test]
    fn failed_maps_to_500_and_carries_message() {
        let env = TaskEnvelope::failed(TaskId::new(), "/unit_api/task_results", "boom");
        assert_eq!(env.http_status(), 500);
        assert_eq!(env.error.as_deref(), Some("boom"));
    }

    #[test]
    fn locked_is_202_with_lock_name() {
        let env = TaskEnvelope::locked(TaskId::new(), "/unit_api/task_results", "update-lock");
        assert_eq!(env.http_status(), 202);
        assert_eq!(env.lock.as_deref(), Some("update-lock"));
    }

    #[test]
    fn result_url_path_embeds_task_id() {
        let id = TaskId::new();
        let env = TaskEnvelope::pending(id, "/unit_api/task_results");
        assert_eq!(env.result_url_path, format!("/unit_api/task_results/{id}"));
    }

    #[test]
    fn pending_and_locked_serialize_to_state_strings() {
        assert_eq!(
            serde_json::to_value(TaskStatus::PendingOrNotPresent).unwrap(),
            serde_json::json!("pending or not present")
        );
        assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), serde_json::json!("in_progress"));
    }
}
