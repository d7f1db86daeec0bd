// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit, ordered schema migrations, run once at `Store::connect`
//! time. The teacher's storage layer applies its WAL/snapshot schema
//! the same way: a fixed ordered list of DDL statements rather than an
//! implicit sync-from-structs step.

use crate::StoreError;
use sqlx::SqlitePool;

/// Each entry is one forward-only migration step. Statements within a
/// step run in a single transaction.
const MIGRATIONS: &[&[&str]] = &[
    // 1: experiments, workers, assignments, assignment history
    &[
        "CREATE TABLE IF NOT EXISTS experiments (
            experiment TEXT PRIMARY KEY,
            created_at TEXT NOT NULL,
            description TEXT,
            media_used TEXT,
            organism_used TEXT
        )",
        "CREATE TABLE IF NOT EXISTS workers (
            pioreactor_unit TEXT PRIMARY KEY,
            added_at TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            model_name TEXT,
            model_version TEXT
        )",
        "CREATE TABLE IF NOT EXISTS assignments (
            pioreactor_unit TEXT PRIMARY KEY REFERENCES workers(pioreactor_unit),
            experiment TEXT NOT NULL REFERENCES experiments(experiment),
            assigned_at TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS assignment_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pioreactor_unit TEXT NOT NULL,
            experiment TEXT NOT NULL,
            assigned_at TEXT NOT NULL,
            unassigned_at TEXT
        )",
        "CREATE INDEX IF NOT EXISTS idx_assignment_history_unit
            ON assignment_history(pioreactor_unit, assigned_at)",
    ],
    // 2: logs
    &[
        "CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            level TEXT NOT NULL,
            pioreactor_unit TEXT NOT NULL,
            experiment TEXT NOT NULL,
            task TEXT NOT NULL,
            source TEXT NOT NULL,
            message TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_logs_experiment_ts ON logs(experiment, timestamp)",
        "CREATE INDEX IF NOT EXISTS idx_logs_unit_ts ON logs(pioreactor_unit, timestamp)",
    ],
    // 3: time-series tables, one per metric, plus the generic fallback
    &[
        "CREATE TABLE IF NOT EXISTS growth_rates (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL,
            timestamp TEXT NOT NULL, rate REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS od_readings (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL, channel TEXT NOT NULL,
            timestamp TEXT NOT NULL, od_reading REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, channel, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS od_readings_filtered (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL, channel TEXT NOT NULL,
            timestamp TEXT NOT NULL, normalized_od_reading REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, channel, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS od_readings_fused (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL,
            timestamp TEXT NOT NULL, od_reading REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS raw_od_readings (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL, channel TEXT NOT NULL,
            timestamp TEXT NOT NULL, od_reading REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, channel, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS temperature_readings (
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL,
            timestamp TEXT NOT NULL, temperature REAL NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit, timestamp)
        )",
        "CREATE TABLE IF NOT EXISTS time_series_generic (
            data_source TEXT NOT NULL, column_name TEXT NOT NULL,
            experiment TEXT NOT NULL, pioreactor_unit TEXT NOT NULL,
            timestamp TEXT NOT NULL, value REAL NOT NULL,
            PRIMARY KEY (data_source, column_name, experiment, pioreactor_unit, timestamp)
        )",
    ],
    // 4: config history and unit labels
    &[
        "CREATE TABLE IF NOT EXISTS config_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            code TEXT NOT NULL,
            written_at TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS unit_labels (
            experiment TEXT NOT NULL,
            pioreactor_unit TEXT NOT NULL,
            label TEXT NOT NULL,
            PRIMARY KEY (experiment, pioreactor_unit)
        )",
    ],
];

pub async fn run(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    for (step_index, step) in MIGRATIONS.iter().enumerate() {
        let mut tx = pool.begin().await?;
        for stmt in *step {
            sqlx::query(stmt)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Migration(format!("step {}: {e}", step_index + 1)))?;
        }
        tx.commit().await?;
    }
    Ok(())
}
