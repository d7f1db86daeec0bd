// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure resolution of a `TargetQuery` against an inventory snapshot
//! (spec §4.7). Kept free of I/O and the `Store` so it's trivially
//! unit-testable, mirroring the teacher's separation of pure decision
//! functions (`engine::runtime::gate`) from async execution.

use crate::error::TargetError;
use rc_core::UnitId;
use rc_wire::targeting::{IncludeLeader, Precedence, TargetQuery};
use std::collections::BTreeSet;

/// A worker row plus its current assignment, as seen by the inventory
/// snapshot the caller loaded from the `Store` before calling `resolve`.
#[derive(Debug, Clone)]
pub struct InventoryUnit {
    pub unit: UnitId,
    pub is_active: bool,
    pub assigned_experiment: Option<String>,
}

pub struct Targeter;

impl Targeter {
    /// Resolves `query` against `inventory` and the configured leader
    /// unit, returning a sorted, deduplicated set of target units.
    pub fn resolve(
        query: &TargetQuery,
        inventory: &[InventoryUnit],
        leader_unit: &UnitId,
    ) -> Result<Vec<UnitId>, TargetError> {
        // Step 2: inventory base.
        let base: BTreeSet<UnitId> = inventory
            .iter()
            .filter(|u| !query.active_only || u.is_active)
            .map(|u| u.unit.clone())
            .collect();

        // Step 1: expand experiments to their active-worker sets.
        let mut experiment_set: Option<BTreeSet<UnitId>> = None;
        if !query.experiments.is_empty() {
            let mut set = BTreeSet::new();
            for experiment in &query.experiments {
                let matches: Vec<&InventoryUnit> = inventory
                    .iter()
                    .filter(|u| u.assigned_experiment.as_deref() == Some(experiment.as_str()) && u.is_active)
                    .collect();
                if matches.is_empty() {
                    return Err(TargetError::EmptyExperimentExpansion(experiment.as_str().to_string()));
                }
                set.extend(matches.into_iter().map(|u| u.unit.clone()));
            }
            experiment_set = Some(set);
        }

        // Step 3: unit option set, optionally filtered by inventory.
        let unit_set: Option<BTreeSet<UnitId>> = if query.units.is_empty() {
            None
        } else if query.filter_non_workers {
            Some(query.units.iter().filter(|u| base.contains(*u)).cloned().collect())
        } else {
            Some(query.units.iter().cloned().collect())
        };

        // Step 4: combine per precedence.
        let mut resolved: BTreeSet<UnitId> = match (unit_set, experiment_set) {
            (None, None) => base,
            (Some(units), None) => units,
            (None, Some(experiments)) => experiments,
            (Some(units), Some(experiments)) => match query.precedence {
                Precedence::Intersection => units.intersection(&experiments).cloned().collect(),
                Precedence::Units => units,
                Precedence::Experiments => experiments,
            },
        };

        // Step 5: leader inclusion.
        match query.include_leader {
            IncludeLeader::Yes => {
                resolved.insert(leader_unit.clone());
            }
            IncludeLeader::No => {
                resolved.remove(leader_unit);
            }
            IncludeLeader::FollowInventory => {}
        }

        // Step 6.
        if resolved.is_empty() {
            return Err(TargetError::EmptyResult);
        }
        Ok(resolved.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Vec<InventoryUnit> {
        vec![
            InventoryUnit { unit: UnitId::new("w1"), is_active: true, assigned_experiment: Some("exp1".into()) },
            InventoryUnit { unit: UnitId::new("w2"), is_active: true, assigned_experiment: Some("exp2".into()) },
            InventoryUnit { unit: UnitId::new("w3"), is_active: false, assigned_experiment: None },
        ]
    }

    #[test]
    fn empty_query_resolves_to_inventory_base() {
        let result = Targeter::resolve(&TargetQuery::default(), &inventory(), &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w1"), UnitId::new("w2"), UnitId::new("w3")]);
    }

    #[test]
    fn active_only_excludes_inactive_workers() {
        let query = TargetQuery { active_only: true, ..Default::default() };
        let result = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w1"), UnitId::new("w2")]);
    }

    #[test]
    fn experiment_expansion_with_no_matches_is_an_error() {
        let query = TargetQuery { experiments: vec!["exp9".into()], ..Default::default() };
        let err = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap_err();
        assert_eq!(err, TargetError::EmptyExperimentExpansion("exp9".to_string()));
    }

    #[test]
    fn intersection_precedence_is_default_and_narrows() {
        let query = TargetQuery {
            units: vec!["w1".into(), "w2".into()],
            experiments: vec!["exp1".into()],
            ..Default::default()
        };
        let result = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w1")]);
    }

    #[test]
    fn units_precedence_ignores_experiment_set() {
        let query = TargetQuery {
            units: vec!["w3".into()],
            experiments: vec!["exp1".into()],
            precedence: Precedence::Units,
            ..Default::default()
        };
        let result = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w3")]);
    }

    #[test]
    fn include_leader_yes_adds_leader_even_if_not_inventoried() {
        let query = TargetQuery { include_leader: IncludeLeader::Yes, ..Default::default() };
        let result = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap();
        assert!(result.contains(&UnitId::new("leader")));
    }

    #[test]
    fn include_leader_no_removes_it_from_the_base() {
        let mut inv = inventory();
        inv.push(InventoryUnit { unit: UnitId::new("leader"), is_active: true, assigned_experiment: None });
        let query = TargetQuery { include_leader: IncludeLeader::No, ..Default::default() };
        let result = Targeter::resolve(&query, &inv, &UnitId::new("leader")).unwrap();
        assert!(!result.contains(&UnitId::new("leader")));
    }

    #[test]
    fn empty_resolution_is_an_error() {
        let query = TargetQuery { active_only: true, ..Default::default() };
        let empty_inventory = vec![InventoryUnit { unit: UnitId::new("w1"), is_active: false, assigned_experiment: None }];
        let err = Targeter::resolve(&query, &empty_inventory, &UnitId::new("leader")).unwrap_err();
        assert_eq!(err, TargetError::EmptyResult);
    }

    #[test]
    fn experiment_expansion_excludes_inactive_assigned_workers() {
        let mut inv = inventory();
        inv.push(InventoryUnit { unit: UnitId::new("w4"), is_active: false, assigned_experiment: Some("exp1".into()) });
        let query = TargetQuery {
            experiments: vec!["exp1".into()],
            precedence: Precedence::Experiments,
            units: vec!["w4".into()],
            filter_non_workers: false,
            ..Default::default()
        };
        let result = Targeter::resolve(&query, &inv, &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w1")]);
        assert!(!result.contains(&UnitId::new("w4")));
    }

    #[test]
    fn filter_non_workers_drops_units_outside_inventory_base() {
        let query = TargetQuery {
            units: vec!["w1".into(), "ghost".into()],
            filter_non_workers: true,
            ..Default::default()
        };
        let result = Targeter::resolve(&query, &inventory(), &UnitId::new("leader")).unwrap();
        assert_eq!(result, vec![UnitId::new("w1")]);
    }
}
