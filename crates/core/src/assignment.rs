// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The (unit, experiment) assignment relation and its append-only history.

use crate::experiment::ExperimentId;
use crate::unit::UnitId;
use serde::{Deserialize, Serialize};

/// A worker's current experiment assignment. At most one exists per unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub pioreactor_unit: UnitId,
    pub experiment: ExperimentId,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}

/// An append-only record of an assignment's lifetime, used to attribute
/// historical logs/readings to the experiment active at their timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentHistoryEntry {
    pub pioreactor_unit: UnitId,
    pub experiment: ExperimentId,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    pub unassigned_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AssignmentHistoryEntry {
    /// Whether this assignment was active at `at`, per invariant 3: a log
    /// row is attributed to the experiment whose window covers its
    /// timestamp, with a 5s grace period past `unassigned_at`.
    pub fn covers(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        if at < self.assigned_at {
            return false;
        }
        match self.unassigned_at {
            Some(unassigned) => at <= unassigned + chrono::Duration::seconds(5),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(assigned_at: chrono::DateTime<Utc>, unassigned_at: Option<chrono::DateTime<Utc>>) -> AssignmentHistoryEntry {
        AssignmentHistoryEntry {
            pioreactor_unit: UnitId::new("worker-1"),
            experiment: ExperimentId::new("exp1"),
            assigned_at,
            unassigned_at,
        }
    }

    #[test]
    fn open_ended_assignment_covers_everything_after_start() {
        let start = Utc::now();
        let e = entry(start, None);
        assert!(e.covers(start));
        assert!(e.covers(start + Duration::days(1)));
        assert!(!e.covers(start - Duration::seconds(1)));
    }

    #[test]
    fn closed_assignment_covers_with_five_second_grace() {
        let start = Utc::now();
        let end = start + Duration::minutes(10);
        let e = entry(start, Some(end));
        assert!(e.covers(end + Duration::seconds(5)));
        assert!(!e.covers(end + Duration::seconds(6)));
    }
}
