// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Leader-side asynchronous task identity and state.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies a leader-side asynchronous task (a queued mutation,
    /// export, or config sync).
    pub struct TaskId("tsk-");
}

/// Lifecycle state of a queued task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    Complete,
    Failed,
    /// A second task attempted to start under an already-held named lock.
    Locked,
}

crate::simple_display! {
    TaskState {
        Pending => "pending",
        InProgress => "in_progress",
        Complete => "complete",
        Failed => "failed",
        Locked => "locked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_task_prefix() {
        let id = TaskId::new();
        assert!(id.as_str().starts_with("tsk-"));
    }

    #[test]
    fn state_displays_as_snake_case() {
        assert_eq!(TaskState::InProgress.to_string(), "in_progress");
        assert_eq!(TaskState::Locked.to_string(), "locked");
    }
}
