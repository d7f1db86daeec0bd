// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inputs to `Targeter::resolve` (spec §4.7): the shape of a cluster-scoped
//! action's targeting options, as received over HTTP.

use rc_core::{ExperimentId, UnitId};
use serde::{Deserialize, Serialize};

/// Tie-break rule when both `units` and `experiments` are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    Intersection,
    Experiments,
    Units,
}

impl Default for Precedence {
    fn default() -> Self {
        Precedence::Intersection
    }
}

/// Three-valued leader inclusion: explicit true/false, or "follow
/// inventory" (spec §4.7 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IncludeLeader {
    Yes,
    No,
    #[default]
    FollowInventory,
}

/// A request's targeting options, deserialized from query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetQuery {
    #[serde(default)]
    pub units: Vec<UnitId>,
    #[serde(default)]
    pub experiments: Vec<ExperimentId>,
    #[serde(default)]
    pub active_only: bool,
    #[serde(default)]
    pub include_leader: IncludeLeader,
    #[serde(default)]
    pub filter_non_workers: bool,
    #[serde(default)]
    pub precedence: Precedence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_intersection_precedence_and_empty_sets() {
        let q = TargetQuery::default();
        assert!(q.units.is_empty());
        assert!(q.experiments.is_empty());
        assert_eq!(q.precedence, Precedence::Intersection);
        assert_eq!(q.include_leader, IncludeLeader::FollowInventory);
    }

    #[test]
    fn deserializes_from_json() {
        let q: TargetQuery = serde_json::from_str(
            r#"{"units":["u1"],"experiments":["exp1"],"active_only":true,"precedence":"units"}"#,
        )
        .unwrap();
        assert_eq!(q.units, vec![UnitId::new("u1")]);
        assert!(q.active_only);
        assert_eq!(q.precedence, Precedence::Units);
    }
}
