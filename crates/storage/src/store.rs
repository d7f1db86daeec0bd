// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The central `Store`: one pool for reads (SQLite WAL gives
//! non-blocking readers), one write lock serializing `modify` calls
//! onto that same pool so the leader behaves as a single writer
//! without a second connection class (spec §4.1, §5).

use crate::{exec, migrations, Row, SqlValue, StoreError};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Open (creating if absent) the SQLite database at `path` and run
    /// pending migrations.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(path)
            .map_err(sqlx::Error::from)?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        migrations::run(&pool).await?;
        Ok(Self { pool, write_lock: Arc::new(Mutex::new(())) })
    }

    /// An in-memory store, used by tests and by any one-shot CLI
    /// invocation that doesn't need durability.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        Self::connect(":memory:").await
    }

    /// Execute a mutating statement. Returns the number of affected
    /// rows; constraint violations return `Ok(0)` rather than an
    /// error (spec §4.1).
    pub async fn modify(&self, stmt: &str, params: &[SqlValue]) -> Result<u64, StoreError> {
        let _guard = self.write_lock.lock().await;
        exec::modify(&self.pool, stmt, params).await
    }

    /// Run `modify` calls as a single atomic unit. `statements` run in
    /// the order given inside one transaction; if any fails with an
    /// error (not a constraint violation — those still short-circuit
    /// the whole batch to `Ok(false)`), the transaction rolls back.
    pub async fn modify_atomically(&self, statements: &[(&str, Vec<SqlValue>)]) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        for (stmt, params) in statements {
            let query = exec::bind_all(sqlx::query(stmt), params);
            match query.execute(&mut *tx).await {
                Ok(_) => {}
                Err(sqlx::Error::Database(db_err))
                    if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
                {
                    tx.rollback().await?;
                    return Ok(false);
                }
                Err(other) => return Err(StoreError::Database(other)),
            }
        }
        tx.commit().await?;
        Ok(true)
    }

    /// Read-only query returning every matching row.
    pub async fn query(&self, stmt: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        exec::query_rows(&self.pool, stmt, params).await
    }

    /// Read-only query returning at most one row.
    pub async fn query_one(&self, stmt: &str, params: &[SqlValue]) -> Result<Option<Row>, StoreError> {
        exec::query_one(&self.pool, stmt, params).await
    }

    /// Best-effort space reclamation after a destructive delete (spec
    /// §4.1). Runs off the write lock in the background; failure is
    /// logged and swallowed, never surfaced to the caller.
    pub fn reclaim_space_in_background(&self) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(err) = sqlx::query("PRAGMA incremental_vacuum").execute(&pool).await {
                tracing::warn!(error = %err, "space reclamation failed");
            }
        });
    }

    /// A handle that only exposes `query`/`query_one`, for call sites
    /// that must not be able to write even by accident (spec §4.1:
    /// "query-only mode per call").
    pub fn read_only(&self) -> ReadOnlyStore<'_> {
        ReadOnlyStore { inner: self }
    }
}

/// A borrowed view of [`Store`] exposing only read access.
pub struct ReadOnlyStore<'a> {
    inner: &'a Store,
}

impl ReadOnlyStore<'_> {
    pub async fn query(&self, stmt: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
        self.inner.query(stmt, params).await
    }

    pub async fn query_one(&self, stmt: &str, params: &[SqlValue]) -> Result<Option<Row>, StoreError> {
        self.inner.query_one(stmt, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_in_memory_runs_migrations() {
        let store = Store::connect_in_memory().await.unwrap();
        let rows = store.query("SELECT * FROM experiments", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn modify_returns_affected_rows() {
        let store = Store::connect_in_memory().await.unwrap();
        let affected = store
            .modify(
                "INSERT INTO experiments (experiment, created_at) VALUES (?, ?)",
                &[SqlValue::from("exp1"), SqlValue::from("2026-01-01T00:00:00Z")],
            )
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn modify_returns_zero_on_duplicate_primary_key() {
        let store = Store::connect_in_memory().await.unwrap();
        let insert = "INSERT INTO experiments (experiment, created_at) VALUES (?, ?)";
        store
            .modify(insert, &[SqlValue::from("exp1"), SqlValue::from("t")])
            .await
            .unwrap();
        let second = store
            .modify(insert, &[SqlValue::from("exp1"), SqlValue::from("t2")])
            .await
            .unwrap();
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn modify_atomically_rolls_back_on_violation() {
        let store = Store::connect_in_memory().await.unwrap();
        let insert = "INSERT INTO experiments (experiment, created_at) VALUES (?, ?)";
        let ok = store
            .modify_atomically(&[
                (insert, vec![SqlValue::from("exp1"), SqlValue::from("t")]),
                (insert, vec![SqlValue::from("exp1"), SqlValue::from("t")]),
            ])
            .await
            .unwrap();
        assert!(!ok);
        let rows = store.query("SELECT * FROM experiments", &[]).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn read_only_handle_can_still_query() {
        let store = Store::connect_in_memory().await.unwrap();
        let rows = store.read_only().query("SELECT * FROM workers", &[]).await.unwrap();
        assert!(rows.is_empty());
    }
}
