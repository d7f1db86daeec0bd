// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker inventory (spec §3).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerRow {
    pub pioreactor_unit: String,
    pub added_at: DateTime<Utc>,
    pub is_active: bool,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
}

pub async fn insert(
    store: &Store,
    unit: &str,
    is_active: bool,
    model_name: Option<&str>,
    model_version: Option<&str>,
    added_at: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let affected = store
        .modify(
            "INSERT INTO workers (pioreactor_unit, added_at, is_active, model_name, model_version)
             VALUES (?, ?, ?, ?, ?)",
            &[
                SqlValue::from(unit.to_string()),
                SqlValue::from(added_at.to_rfc3339()),
                SqlValue::from(is_active),
                model_name.map(|v| v.to_string()).into(),
                model_version.map(|v| v.to_string()).into(),
            ],
        )
        .await?;
    Ok(affected == 1)
}

pub async fn get(store: &Store, unit: &str) -> Result<Option<WorkerRow>, StoreError> {
    let row = store
        .query_one("SELECT * FROM workers WHERE pioreactor_unit = ?", &[SqlValue::from(unit.to_string())])
        .await?;
    Ok(row.map(from_row))
}

pub async fn list(store: &Store) -> Result<Vec<WorkerRow>, StoreError> {
    let rows = store.query("SELECT * FROM workers ORDER BY pioreactor_unit ASC", &[]).await?;
    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn list_active(store: &Store) -> Result<Vec<WorkerRow>, StoreError> {
    let rows = store
        .query("SELECT * FROM workers WHERE is_active = 1 ORDER BY pioreactor_unit ASC", &[])
        .await?;
    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn set_active(store: &Store, unit: &str, is_active: bool) -> Result<bool, StoreError> {
    let affected = store
        .modify(
            "UPDATE workers SET is_active = ? WHERE pioreactor_unit = ?",
            &[SqlValue::from(is_active), SqlValue::from(unit.to_string())],
        )
        .await?;
    Ok(affected == 1)
}

pub async fn update_model(
    store: &Store,
    unit: &str,
    model_name: Option<&str>,
    model_version: Option<&str>,
) -> Result<bool, StoreError> {
    let affected = store
        .modify(
            "UPDATE workers SET model_name = ?, model_version = ? WHERE pioreactor_unit = ?",
            &[
                model_name.map(|v| v.to_string()).into(),
                model_version.map(|v| v.to_string()).into(),
                SqlValue::from(unit.to_string()),
            ],
        )
        .await?;
    Ok(affected == 1)
}

/// Removes a worker from inventory. The caller is responsible for
/// having already killed its jobs and purged its unit-specific config
/// (spec §3 Worker lifecycle) — that's a `Multicaster`/filesystem
/// concern, not the Store's.
pub async fn delete(store: &Store, unit: &str) -> Result<bool, StoreError> {
    let affected = store
        .modify("DELETE FROM workers WHERE pioreactor_unit = ?", &[SqlValue::from(unit.to_string())])
        .await?;
    Ok(affected == 1)
}

fn from_row(row: crate::Row) -> WorkerRow {
    WorkerRow {
        pioreactor_unit: row.get("pioreactor_unit").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        added_at: row
            .get("added_at")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        is_active: row.get("is_active").and_then(|v| v.as_i64()).map(|v| v != 0).unwrap_or(false),
        model_name: row.get("model_name").and_then(|v| v.as_str()).map(str::to_string),
        model_version: row.get("model_version").and_then(|v| v.as_str()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_list_active_filters_inactive() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, "u1", true, None, None, Utc::now()).await.unwrap();
        insert(&store, "u2", false, None, None, Utc::now()).await.unwrap();
        let active = list_active(&store).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pioreactor_unit, "u1");
    }

    #[tokio::test]
    async fn set_active_flips_the_flag() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, "u1", true, None, None, Utc::now()).await.unwrap();
        set_active(&store, "u1", false).await.unwrap();
        assert!(!get(&store, "u1").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn update_model_sets_descriptors() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, "u1", true, None, None, Utc::now()).await.unwrap();
        update_model(&store, "u1", Some("Pioreactor 20ml"), Some("1.1")).await.unwrap();
        let row = get(&store, "u1").await.unwrap().unwrap();
        assert_eq!(row.model_name.as_deref(), Some("Pioreactor 20ml"));
        assert_eq!(row.model_version.as_deref(), Some("1.1"));
    }
}
