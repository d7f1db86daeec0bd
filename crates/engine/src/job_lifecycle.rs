// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-local job state machine (spec §4.6). Transitions are
//! commanded over the Bus via `$state/set`; this module only encodes
//! which transitions are legal, the same shape as
//! [`crate::targeter::Targeter`] — pure, no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Init,
    Ready,
    Sleeping,
    Disconnected,
    /// Not a commanded state: assigned by the (out-of-scope) monitor
    /// subsystem when a job stops heartbeating. Included here only so
    /// `JobState` can round-trip values the registry may observe.
    Lost,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Init => "init",
            JobState::Ready => "ready",
            JobState::Sleeping => "sleeping",
            JobState::Disconnected => "disconnected",
            JobState::Lost => "lost",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("cannot transition from {from} to {to}: {from} is terminal")]
    Terminal { from: JobState, to: JobState },
    #[error("{from} has no transition to {to}")]
    Illegal { from: JobState, to: JobState },
}

impl JobState {
    /// Validates a commanded transition against the diagram in spec
    /// §4.6. `disconnected` is terminal: once reached, no further
    /// `$state/set` command is honored.
    pub fn transition(self, to: JobState) -> Result<JobState, TransitionError> {
        use JobState::*;
        match (self, to) {
            (Disconnected, _) if to != Disconnected => Err(TransitionError::Terminal { from: self, to }),
            (Init, Ready) => Ok(Ready),
            (Ready, Sleeping) => Ok(Sleeping),
            (Sleeping, Ready) => Ok(Ready),
            (_, Disconnected) => Ok(Disconnected),
            (current, target) if current == target => Ok(target),
            (from, to) => Err(TransitionError::Illegal { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_can_become_ready() {
        assert_eq!(JobState::Init.transition(JobState::Ready).unwrap(), JobState::Ready);
    }

    #[test]
    fn ready_and_sleeping_toggle() {
        assert_eq!(JobState::Ready.transition(JobState::Sleeping).unwrap(), JobState::Sleeping);
        assert_eq!(JobState::Sleeping.transition(JobState::Ready).unwrap(), JobState::Ready);
    }

    #[test]
    fn any_state_can_disconnect() {
        assert_eq!(JobState::Init.transition(JobState::Disconnected).unwrap(), JobState::Disconnected);
        assert_eq!(JobState::Sleeping.transition(JobState::Disconnected).unwrap(), JobState::Disconnected);
    }

    #[test]
    fn disconnected_is_terminal() {
        let err = JobState::Disconnected.transition(JobState::Ready).unwrap_err();
        assert!(matches!(err, TransitionError::Terminal { .. }));
    }

    #[test]
    fn init_cannot_go_straight_to_sleeping() {
        let err = JobState::Init.transition(JobState::Sleeping).unwrap_err();
        assert!(matches!(err, TransitionError::Illegal { .. }));
    }
}
