// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log ingest and filtered queries (spec §3 LogRecord, §4.7 recent_logs/logs).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Utc};
use rc_core::{LogLevel, LogRecord};

pub async fn insert(store: &Store, record: &LogRecord) -> Result<(), StoreError> {
    store
        .modify(
            "INSERT INTO logs (timestamp, level, pioreactor_unit, experiment, task, source, message)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            &[
                SqlValue::from(record.timestamp.to_rfc3339()),
                SqlValue::from(record.level.as_str().to_string()),
                SqlValue::from(record.pioreactor_unit.as_str().to_string()),
                SqlValue::from(record.experiment.as_str().to_string()),
                SqlValue::from(record.task.clone()),
                SqlValue::from(record.source.clone()),
                SqlValue::from(record.message.clone()),
            ],
        )
        .await?;
    Ok(())
}

/// Logs for `experiment` at or above `min_level`, newest first,
/// paginated by `skip`/`limit`.
pub async fn recent_for_experiment(
    store: &Store,
    experiment: &str,
    min_level: LogLevel,
    skip: i64,
    limit: i64,
) -> Result<Vec<LogRecord>, StoreError> {
    let levels = min_level.at_least();
    let placeholders = levels.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let stmt = format!(
        "SELECT * FROM logs WHERE experiment = ? AND level IN ({placeholders})
         ORDER BY timestamp DESC LIMIT ? OFFSET ?"
    );
    let mut params = vec![SqlValue::from(experiment.to_string())];
    params.extend(levels.iter().map(|l| SqlValue::from(l.as_str().to_string())));
    params.push(SqlValue::from(limit));
    params.push(SqlValue::from(skip));

    let rows = store.query(&stmt, &params).await?;
    Ok(rows.into_iter().map(from_row).collect())
}

pub async fn recent_for_unit(
    store: &Store,
    unit: &str,
    min_level: LogLevel,
    skip: i64,
    limit: i64,
) -> Result<Vec<LogRecord>, StoreError> {
    let levels = min_level.at_least();
    let placeholders = levels.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let stmt = format!(
        "SELECT * FROM logs WHERE pioreactor_unit = ? AND level IN ({placeholders})
         ORDER BY timestamp DESC LIMIT ? OFFSET ?"
    );
    let mut params = vec![SqlValue::from(unit.to_string())];
    params.extend(levels.iter().map(|l| SqlValue::from(l.as_str().to_string())));
    params.push(SqlValue::from(limit));
    params.push(SqlValue::from(skip));

    let rows = store.query(&stmt, &params).await?;
    Ok(rows.into_iter().map(from_row).collect())
}

fn from_row(row: crate::Row) -> LogRecord {
    LogRecord {
        timestamp: row
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        level: row
            .get("level")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogLevel::Info),
        pioreactor_unit: rc_core::UnitId::new(row.get("pioreactor_unit").and_then(|v| v.as_str()).unwrap_or_default()),
        experiment: rc_core::ExperimentId::new(row.get("experiment").and_then(|v| v.as_str()).unwrap_or_default()),
        task: row.get("task").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        source: row.get("source").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        message: row.get("message").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::{ExperimentId, UnitId};

    fn record(level: LogLevel, message: &str) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            level,
            pioreactor_unit: UnitId::new("u1"),
            experiment: ExperimentId::new("exp1"),
            task: "stirring".to_string(),
            source: "app".to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn min_level_floor_excludes_less_severe_rows() {
        let store = Store::connect_in_memory().await.unwrap();
        insert(&store, &record(LogLevel::Error, "err")).await.unwrap();
        insert(&store, &record(LogLevel::Debug, "dbg")).await.unwrap();
        let warnings_and_up = recent_for_experiment(&store, "exp1", LogLevel::Warning, 0, 100).await.unwrap();
        assert_eq!(warnings_and_up.len(), 1);
        assert_eq!(warnings_and_up[0].message, "err");
    }

    #[tokio::test]
    async fn debug_floor_includes_everything() {
        let store = Store::connect_in_memory().await.unwrap();
        for level in [LogLevel::Error, LogLevel::Warning, LogLevel::Notice, LogLevel::Info, LogLevel::Debug] {
            insert(&store, &record(level, "m")).await.unwrap();
        }
        let all = recent_for_experiment(&store, "exp1", LogLevel::Debug, 0, 100).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn pagination_skips_newest_first() {
        let store = Store::connect_in_memory().await.unwrap();
        for i in 0..5 {
            insert(&store, &record(LogLevel::Info, &format!("m{i}"))).await.unwrap();
        }
        let page = recent_for_experiment(&store, "exp1", LogLevel::Info, 2, 2).await.unwrap();
        assert_eq!(page.len(), 2);
    }
}
