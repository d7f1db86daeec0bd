// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment CRUD (spec §3, §4.7).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperimentRow {
    pub experiment: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub media_used: Option<String>,
    pub organism_used: Option<String>,
}

/// Insert a new experiment. Returns `false` (no error) if the name is
/// already taken — the caller maps that to 409 (spec §7).
pub async fn insert(
    store: &Store,
    experiment: &str,
    description: Option<&str>,
    media_used: Option<&str>,
    organism_used: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let affected = store
        .modify(
            "INSERT INTO experiments (experiment, created_at, description, media_used, organism_used)
             VALUES (?, ?, ?, ?, ?)",
            &[
                SqlValue::from(experiment.to_string()),
                SqlValue::from(created_at.to_rfc3339()),
                description.map(|d| d.to_string()).into(),
                media_used.map(|d| d.to_string()).into(),
                organism_used.map(|d| d.to_string()).into(),
            ],
        )
        .await?;
    Ok(affected == 1)
}

pub async fn get(store: &Store, experiment: &str) -> Result<Option<ExperimentRow>, StoreError> {
    let row = store
        .query_one("SELECT * FROM experiments WHERE experiment = ?", &[SqlValue::from(experiment.to_string())])
        .await?;
    Ok(row.map(from_row))
}

pub async fn list(store: &Store) -> Result<Vec<ExperimentRow>, StoreError> {
    let rows = store.query("SELECT * FROM experiments ORDER BY created_at ASC", &[]).await?;
    Ok(rows.into_iter().map(from_row).collect())
}

/// Delete an experiment. Cascades to assignments (spec §3); the caller
/// is responsible for calling `assignments::delete_for_experiment`
/// first/inside the same transaction-like sequence, and for kicking
/// off `Store::reclaim_space_in_background` afterward.
pub async fn delete(store: &Store, experiment: &str) -> Result<bool, StoreError> {
    let affected = store
        .modify("DELETE FROM experiments WHERE experiment = ?", &[SqlValue::from(experiment.to_string())])
        .await?;
    Ok(affected == 1)
}

pub async fn update(
    store: &Store,
    experiment: &str,
    description: Option<&str>,
    media_used: Option<&str>,
    organism_used: Option<&str>,
) -> Result<bool, StoreError> {
    let affected = store
        .modify(
            "UPDATE experiments SET description = COALESCE(?, description),
                                     media_used = COALESCE(?, media_used),
                                     organism_used = COALESCE(?, organism_used)
             WHERE experiment = ?",
            &[
                description.map(|d| d.to_string()).into(),
                media_used.map(|d| d.to_string()).into(),
                organism_used.map(|d| d.to_string()).into(),
                SqlValue::from(experiment.to_string()),
            ],
        )
        .await?;
    Ok(affected == 1)
}

/// Distinct `organism_used` values across all experiments, for UI
/// autocomplete (SPEC_FULL §4.7).
pub async fn historical_organisms(store: &Store) -> Result<Vec<String>, StoreError> {
    distinct_non_null(store, "organism_used").await
}

/// Distinct `media_used` values across all experiments.
pub async fn historical_media(store: &Store) -> Result<Vec<String>, StoreError> {
    distinct_non_null(store, "media_used").await
}

async fn distinct_non_null(store: &Store, column: &str) -> Result<Vec<String>, StoreError> {
    let stmt = format!("SELECT DISTINCT {column} AS v FROM experiments WHERE {column} IS NOT NULL ORDER BY {column}");
    let rows = store.query(&stmt, &[]).await?;
    Ok(rows.into_iter().filter_map(|r| r.get("v").and_then(|v| v.as_str().map(str::to_string))).collect())
}

fn from_row(row: crate::Row) -> ExperimentRow {
    ExperimentRow {
        experiment: row.get("experiment").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        created_at: row
            .get("created_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        description: row.get("description").and_then(|v| v.as_str()).map(str::to_string),
        media_used: row.get("media_used").and_then(|v| v.as_str()).map(str::to_string),
        organism_used: row.get("organism_used").and_then(|v| v.as_str()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = Store::connect_in_memory().await.unwrap();
        assert!(insert(&store, "exp1", Some("desc"), None, Some("E. coli"), Utc::now()).await.unwrap());
        let row = get(&store, "exp1").await.unwrap().unwrap();
        assert_eq!(row.description.as_deref(), Some("desc"));
        assert_eq!(row.organism_used.as_deref(), Some("E. coli"));
    }

    #[tokio::test]
    async fn duplicate_insert_returns_false_not_error() {
        let store = Store::connect_in_memory().await.unwrap();
        assert!(insert(&store, "exp1", None, None, None, Utc::now()).await.unwrap());
        assert!(!insert(&store, "exp1", None, None, None, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, "exp1", None, None, None, Utc::now()).await.unwrap();
        assert!(delete(&store, "exp1").await.unwrap());
        assert!(get(&store, "exp1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn historical_organisms_is_distinct_and_sorted() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, "exp1", None, None, Some("E. coli"), Utc::now()).await.unwrap();
        insert(&store, "exp2", None, None, Some("Yeast"), Utc::now()).await.unwrap();
        insert(&store, "exp3", None, None, Some("E. coli"), Utc::now()).await.unwrap();
        assert_eq!(historical_organisms(&store).await.unwrap(), vec!["E. coli", "Yeast"]);
    }
}
