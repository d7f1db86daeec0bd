// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `modify`/`query` primitives underlying the `Store` contract
//! (spec §4.1): a uniform bind-parameter type and a uniform dict-row
//! shape so callers never hand-roll `sqlx::Row` column access.

use crate::StoreError;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo};

/// A bind parameter accepted by [`Store::modify`]/[`Store::query`].
#[derive(Debug, Clone)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    Null,
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

pub(crate) fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    params: &'q [SqlValue],
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    for p in params {
        query = match p {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Real(r) => query.bind(*r),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Null => query.bind(Option::<String>::None),
        };
    }
    query
}

/// A dict-shaped row: column name -> best-effort typed JSON value.
pub type Row = Map<String, Value>;

/// Decode a `SqliteRow` into the uniform dict-row shape, matching
/// column declared types where SQLite reports them and falling back to
/// text otherwise (SQLite's dynamic typing means the declared column
/// type is advisory).
pub(crate) fn row_to_map(row: &SqliteRow) -> Result<Row, StoreError> {
    let mut out = Map::new();
    for (i, col) in row.columns().iter().enumerate() {
        let name = col.name().to_string();
        let type_name = col.type_info().name().to_ascii_uppercase();
        let value = if row.try_get_raw(i).map(|v| v.is_null()).unwrap_or(true) {
            Value::Null
        } else {
            match type_name.as_str() {
                "INTEGER" | "BOOLEAN" => row
                    .try_get::<i64, _>(i)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                "REAL" | "FLOAT" | "DOUBLE" => row
                    .try_get::<f64, _>(i)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
                _ => row
                    .try_get::<String, _>(i)
                    .map(Value::from)
                    .unwrap_or(Value::Null),
            }
        };
        out.insert(name, value);
    }
    Ok(out)
}

/// Execute `stmt` against the pool, binding `params` in order, and
/// return the affected-row count. Constraint violations (unique /
/// foreign key) are swallowed to `Ok(0)` per the `modify` contract;
/// any other database error propagates.
pub(crate) async fn modify(pool: &SqlitePool, stmt: &str, params: &[SqlValue]) -> Result<u64, StoreError> {
    let query = bind_all(sqlx::query(stmt), params);
    match query.execute(pool).await {
        Ok(res) => Ok(res.rows_affected()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() || db_err.is_foreign_key_violation() => {
            Ok(0)
        }
        Err(other) => Err(StoreError::Database(other)),
    }
}

pub(crate) async fn query_rows(pool: &SqlitePool, stmt: &str, params: &[SqlValue]) -> Result<Vec<Row>, StoreError> {
    let query = bind_all(sqlx::query(stmt), params);
    let rows = query.fetch_all(pool).await?;
    rows.iter().map(row_to_map).collect()
}

pub(crate) async fn query_one(pool: &SqlitePool, stmt: &str, params: &[SqlValue]) -> Result<Option<Row>, StoreError> {
    let query = bind_all(sqlx::query(stmt), params);
    match query.fetch_optional(pool).await? {
        Some(row) => Ok(Some(row_to_map(&row)?)),
        None => Ok(None),
    }
}
