// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only history of `PATCH /api/configs/<filename>` writes
//! (spec §4.7).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Utc};

pub async fn record(store: &Store, filename: &str, code: &str, written_at: DateTime<Utc>) -> Result<(), StoreError> {
    store
        .modify(
            "INSERT INTO config_history (filename, code, written_at) VALUES (?, ?, ?)",
            &[SqlValue::from(filename.to_string()), SqlValue::from(code.to_string()), SqlValue::from(written_at.to_rfc3339())],
        )
        .await?;
    Ok(())
}

/// The most recently written body for `filename`, i.e. what
/// `GET /api/configs/<filename>` returns.
pub async fn latest(store: &Store, filename: &str) -> Result<Option<String>, StoreError> {
    let row = store
        .query_one(
            "SELECT code FROM config_history WHERE filename = ? ORDER BY written_at DESC, id DESC LIMIT 1",
            &[SqlValue::from(filename.to_string())],
        )
        .await?;
    Ok(row.and_then(|r| r.get("code").and_then(|v| v.as_str()).map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn patch_then_get_returns_exactly_the_bytes_written() {
        let store = Store::connect_in_memory().await.unwrap();
        record(&store, "config.ini", "[mqtt]\nbroker_address=1.2.3.4\n", Utc::now()).await.unwrap();
        assert_eq!(latest(&store, "config.ini").await.unwrap().as_deref(), Some("[mqtt]\nbroker_address=1.2.3.4\n"));
    }

    #[tokio::test]
    async fn later_write_wins() {
        let store = Store::connect_in_memory().await.unwrap();
        let t0 = Utc::now();
        record(&store, "config.ini", "old", t0).await.unwrap();
        record(&store, "config.ini", "new", t0 + chrono::Duration::seconds(1)).await.unwrap();
        assert_eq!(latest(&store, "config.ini").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn missing_filename_is_none() {
        let store = Store::connect_in_memory().await.unwrap();
        assert_eq!(latest(&store, "nope.ini").await.unwrap(), None);
    }
}
