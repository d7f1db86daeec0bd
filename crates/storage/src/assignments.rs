// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The current-assignment relation and its append-only history
//! (spec §3, invariants 1–3).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Utc};
use rc_core::AssignmentHistoryEntry;

/// Assign `unit` to `experiment`, replacing any prior current
/// assignment for that unit (invariant 1: at most one current
/// experiment per unit). Closes out the prior history row and opens a
/// new one, atomically.
pub async fn assign(store: &Store, unit: &str, experiment: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    let prior = current(store, unit).await?;
    let mut statements: Vec<(&str, Vec<SqlValue>)> = Vec::new();

    if let Some(prior) = &prior {
        statements.push((
            "UPDATE assignment_history SET unassigned_at = ?
             WHERE pioreactor_unit = ? AND experiment = ? AND unassigned_at IS NULL",
            vec![SqlValue::from(at.to_rfc3339()), SqlValue::from(unit.to_string()), SqlValue::from(prior.experiment.clone())],
        ));
    }
    statements.push((
        "INSERT INTO assignments (pioreactor_unit, experiment, assigned_at) VALUES (?, ?, ?)
         ON CONFLICT(pioreactor_unit) DO UPDATE SET experiment = excluded.experiment, assigned_at = excluded.assigned_at",
        vec![SqlValue::from(unit.to_string()), SqlValue::from(experiment.to_string()), SqlValue::from(at.to_rfc3339())],
    ));
    statements.push((
        "INSERT INTO assignment_history (pioreactor_unit, experiment, assigned_at, unassigned_at) VALUES (?, ?, ?, NULL)",
        vec![SqlValue::from(unit.to_string()), SqlValue::from(experiment.to_string()), SqlValue::from(at.to_rfc3339())],
    ));

    store.modify_atomically(&statements).await?;
    Ok(())
}

/// Remove `unit`'s current assignment (e.g. on worker deactivation),
/// closing the open history row.
pub async fn unassign(store: &Store, unit: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    store
        .modify(
            "UPDATE assignment_history SET unassigned_at = ?
             WHERE pioreactor_unit = ? AND unassigned_at IS NULL",
            &[SqlValue::from(at.to_rfc3339()), SqlValue::from(unit.to_string())],
        )
        .await?;
    store
        .modify("DELETE FROM assignments WHERE pioreactor_unit = ?", &[SqlValue::from(unit.to_string())])
        .await?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CurrentAssignment {
    pub pioreactor_unit: String,
    pub experiment: String,
    pub assigned_at: DateTime<Utc>,
}

pub async fn current(store: &Store, unit: &str) -> Result<Option<CurrentAssignment>, StoreError> {
    let row = store
        .query_one("SELECT * FROM assignments WHERE pioreactor_unit = ?", &[SqlValue::from(unit.to_string())])
        .await?;
    Ok(row.map(current_from_row))
}

pub async fn list_for_experiment(store: &Store, experiment: &str) -> Result<Vec<CurrentAssignment>, StoreError> {
    let rows = store
        .query(
            "SELECT * FROM assignments WHERE experiment = ? ORDER BY pioreactor_unit ASC",
            &[SqlValue::from(experiment.to_string())],
        )
        .await?;
    Ok(rows.into_iter().map(current_from_row).collect())
}

pub async fn list_all(store: &Store) -> Result<Vec<CurrentAssignment>, StoreError> {
    let rows = store.query("SELECT * FROM assignments ORDER BY pioreactor_unit ASC", &[]).await?;
    Ok(rows.into_iter().map(current_from_row).collect())
}

pub async fn count_for_experiment(store: &Store, experiment: &str) -> Result<i64, StoreError> {
    let row = store
        .query_one(
            "SELECT COUNT(*) AS n FROM assignments WHERE experiment = ?",
            &[SqlValue::from(experiment.to_string())],
        )
        .await?;
    Ok(row.and_then(|r| r.get("n").and_then(|v| v.as_i64())).unwrap_or(0))
}

/// Removes every current assignment for `experiment`, closing their
/// history rows. Called when an experiment is deleted (invariant 2).
pub async fn delete_for_experiment(store: &Store, experiment: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    store
        .modify(
            "UPDATE assignment_history SET unassigned_at = ?
             WHERE experiment = ? AND unassigned_at IS NULL",
            &[SqlValue::from(at.to_rfc3339()), SqlValue::from(experiment.to_string())],
        )
        .await?;
    store
        .modify("DELETE FROM assignments WHERE experiment = ?", &[SqlValue::from(experiment.to_string())])
        .await?;
    Ok(())
}

/// The full history for a unit, newest first.
pub async fn history_for_unit(store: &Store, unit: &str) -> Result<Vec<AssignmentHistoryEntry>, StoreError> {
    let rows = store
        .query(
            "SELECT * FROM assignment_history WHERE pioreactor_unit = ? ORDER BY assigned_at DESC",
            &[SqlValue::from(unit.to_string())],
        )
        .await?;
    Ok(rows.into_iter().map(history_from_row).collect())
}

/// Resolve the experiment a log row should be attributed to (invariant
/// 3): the historical assignment whose window covers `at`, if any.
pub async fn experiment_at(store: &Store, unit: &str, at: DateTime<Utc>) -> Result<Option<String>, StoreError> {
    let history = history_for_unit(store, unit).await?;
    Ok(history.into_iter().find(|e| e.covers(at)).map(|e| e.experiment.to_string()))
}

fn current_from_row(row: crate::Row) -> CurrentAssignment {
    CurrentAssignment {
        pioreactor_unit: row.get("pioreactor_unit").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        experiment: row.get("experiment").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        assigned_at: parse_ts(row.get("assigned_at")),
    }
}

fn history_from_row(row: crate::Row) -> AssignmentHistoryEntry {
    AssignmentHistoryEntry {
        pioreactor_unit: rc_core::UnitId::new(row.get("pioreactor_unit").and_then(|v| v.as_str()).unwrap_or_default()),
        experiment: rc_core::ExperimentId::new(row.get("experiment").and_then(|v| v.as_str()).unwrap_or_default()),
        assigned_at: parse_ts(row.get("assigned_at")),
        unassigned_at: row
            .get("unassigned_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_ts(value: Option<&serde_json::Value>) -> DateTime<Utc> {
    value
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{experiments, workers};
    use chrono::Duration;

    async fn seeded() -> Store {
        let store = Store::connect_in_memory().await.unwrap();
        workers::insert(&store, "u1", true, None, None, Utc::now()).await.unwrap();
        experiments::insert(&store, "exp1", None, None, None, Utc::now()).await.unwrap();
        experiments::insert(&store, "exp2", None, None, None, Utc::now()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn reassigning_replaces_the_prior_current_row() {
        let store = seeded().await;
        let t0 = Utc::now();
        assign(&store, "u1", "exp1", t0).await.unwrap();
        assign(&store, "u1", "exp2", t0 + Duration::minutes(5)).await.unwrap();
        let current = current(&store, "u1").await.unwrap().unwrap();
        assert_eq!(current.experiment, "exp2");
        assert_eq!(list_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn repeated_identical_assignment_leaves_exactly_one_row() {
        let store = seeded().await;
        let t0 = Utc::now();
        for _ in 0..3 {
            assign(&store, "u1", "exp1", t0).await.unwrap();
        }
        assert_eq!(list_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reassignment_closes_the_prior_history_row() {
        let store = seeded().await;
        let t0 = Utc::now();
        assign(&store, "u1", "exp1", t0).await.unwrap();
        assign(&store, "u1", "exp2", t0 + Duration::minutes(5)).await.unwrap();
        let history = history_for_unit(&store, "u1").await.unwrap();
        assert_eq!(history.len(), 2);
        let exp1_entry = history.iter().find(|e| e.experiment == "exp1").unwrap();
        assert!(exp1_entry.unassigned_at.is_some());
    }

    #[tokio::test]
    async fn experiment_at_attributes_to_the_window_covering_the_timestamp() {
        let store = seeded().await;
        let t0 = Utc::now();
        assign(&store, "u1", "exp1", t0).await.unwrap();
        assign(&store, "u1", "exp2", t0 + Duration::minutes(10)).await.unwrap();
        let attributed = experiment_at(&store, "u1", t0 + Duration::minutes(2)).await.unwrap();
        assert_eq!(attributed.as_deref(), Some("exp1"));
    }

    #[tokio::test]
    async fn delete_for_experiment_removes_current_assignments() {
        let store = seeded().await;
        assign(&store, "u1", "exp1", Utc::now()).await.unwrap();
        delete_for_experiment(&store, "exp1", Utc::now()).await.unwrap();
        assert!(current(&store, "u1").await.unwrap().is_none());
    }
}
