// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The decimated time-series query engine (spec §3 TimeSeriesPoint,
//! §4.7 `GET /experiments/<exp>/time_series/<metric>`, invariant 5).

use crate::{SqlValue, Store, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    GrowthRates,
    OdReadings,
    OdReadingsFiltered,
    OdReadingsFused,
    RawOdReadings,
    TemperatureReadings,
}

impl Metric {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "growth_rates" => Metric::GrowthRates,
            "od_readings" => Metric::OdReadings,
            "od_readings_filtered" => Metric::OdReadingsFiltered,
            "od_readings_fused" => Metric::OdReadingsFused,
            "raw_od_readings" => Metric::RawOdReadings,
            "temperature_readings" => Metric::TemperatureReadings,
            _ => return None,
        })
    }

    fn table(self) -> &'static str {
        match self {
            Metric::GrowthRates => "growth_rates",
            Metric::OdReadings => "od_readings",
            Metric::OdReadingsFiltered => "od_readings_filtered",
            Metric::OdReadingsFused => "od_readings_fused",
            Metric::RawOdReadings => "raw_od_readings",
            Metric::TemperatureReadings => "temperature_readings",
        }
    }

    fn value_column(self) -> &'static str {
        match self {
            Metric::GrowthRates => "rate",
            Metric::OdReadings | Metric::RawOdReadings => "od_reading",
            Metric::OdReadingsFiltered => "normalized_od_reading",
            Metric::OdReadingsFused => "od_reading",
            Metric::TemperatureReadings => "temperature",
        }
    }

    fn has_channel(self) -> bool {
        matches!(self, Metric::OdReadings | Metric::OdReadingsFiltered | Metric::RawOdReadings)
    }

    /// Rounding precision per spec §4.7.
    fn round_dp(self) -> i32 {
        match self {
            Metric::GrowthRates => 5,
            Metric::TemperatureReadings => 2,
            Metric::OdReadings | Metric::OdReadingsFiltered | Metric::OdReadingsFused | Metric::RawOdReadings => 7,
        }
    }
}

#[derive(Debug, Error)]
pub enum TimeSeriesError {
    #[error("target_points must be greater than zero")]
    TargetPointsZero,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: DateTime<Utc>,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeriesResponse {
    pub series: Vec<String>,
    pub data: Vec<Vec<Point>>,
}

/// Query `metric` for `experiment` over the last `lookback` hours,
/// decimating each series so the total returned point count stays
/// within `target_points * 1.1` (invariant 5).
pub async fn query(
    store: &Store,
    experiment: &str,
    metric: Metric,
    lookback: Duration,
    target_points: u32,
) -> Result<SeriesResponse, TimeSeriesError> {
    if target_points == 0 {
        return Err(TimeSeriesError::TargetPointsZero);
    }
    let since = (Utc::now() - lookback).to_rfc3339();
    let value_col = metric.value_column();
    let series_key_col = if metric.has_channel() { "channel" } else { "pioreactor_unit" };
    let stmt = format!(
        "SELECT pioreactor_unit, {series_key_col} AS series_key, timestamp, {value_col} AS value
         FROM {table} WHERE experiment = ? AND timestamp >= ?
         ORDER BY pioreactor_unit ASC, series_key ASC, timestamp ASC",
        table = metric.table(),
    );
    let rows = store
        .query(&stmt, &[SqlValue::from(experiment.to_string()), SqlValue::from(since)])
        .await?;

    let mut by_series: indexmap::IndexMap<String, Vec<Point>> = indexmap::IndexMap::new();
    for row in rows {
        let unit = row.get("pioreactor_unit").and_then(|v| v.as_str()).unwrap_or_default();
        let series_key = row.get("series_key").and_then(|v| v.as_str()).unwrap_or(unit);
        let label = if metric.has_channel() { format!("{unit}-{series_key}") } else { unit.to_string() };
        let ts = row
            .get("timestamp")
            .and_then(|v| v.as_str())
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        let value = row.get("value").and_then(|v| v.as_f64()).unwrap_or(0.0);
        by_series.entry(label).or_default().push(Point { x: ts, y: round_to(value, metric.round_dp()) });
    }

    let total: usize = by_series.values().map(Vec::len).sum();
    let stride = if total as u64 > target_points as u64 {
        ((total as f64) / (target_points as f64)).ceil() as usize
    } else {
        1
    };

    let mut series = Vec::with_capacity(by_series.len());
    let mut data = Vec::with_capacity(by_series.len());
    for (label, points) in by_series {
        let decimated: Vec<Point> = points.into_iter().step_by(stride.max(1)).collect();
        series.push(label);
        data.push(decimated);
    }

    Ok(SeriesResponse { series, data })
}

fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{experiments, workers};

    async fn seeded() -> Store {
        let store = Store::connect_in_memory().await.unwrap();
        workers::insert(&store, "u1", true, None, None, Utc::now()).await.unwrap();
        experiments::insert(&store, "exp1", None, None, None, Utc::now()).await.unwrap();
        store
    }

    async fn insert_growth_rate(store: &Store, ts: DateTime<Utc>, rate: f64) {
        store
            .modify(
                "INSERT INTO growth_rates (experiment, pioreactor_unit, timestamp, rate) VALUES (?, ?, ?, ?)",
                &[
                    SqlValue::from("exp1".to_string()),
                    SqlValue::from("u1".to_string()),
                    SqlValue::from(ts.to_rfc3339()),
                    SqlValue::from(rate),
                ],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn target_points_zero_is_rejected() {
        let store = seeded().await;
        let err = query(&store, "exp1", Metric::GrowthRates, Duration::hours(1), 0).await.unwrap_err();
        assert!(matches!(err, TimeSeriesError::TargetPointsZero));
    }

    #[tokio::test]
    async fn decimates_large_series_to_within_ten_percent_of_target() {
        let store = seeded().await;
        let base = Utc::now() - Duration::hours(1);
        for i in 0..10_000 {
            insert_growth_rate(&store, base + Duration::milliseconds(i), 0.123_456_789).await;
        }
        let resp = query(&store, "exp1", Metric::GrowthRates, Duration::hours(2), 720).await.unwrap();
        let total: usize = resp.data.iter().map(Vec::len).sum();
        assert!(total > 0);
        assert!(total as f64 <= 720.0 * 1.1);
    }

    #[tokio::test]
    async fn growth_rate_values_round_to_five_decimal_places() {
        let store = seeded().await;
        insert_growth_rate(&store, Utc::now(), 0.123_456_789).await;
        let resp = query(&store, "exp1", Metric::GrowthRates, Duration::hours(1), 720).await.unwrap();
        assert_eq!(resp.data[0][0].y, 0.12346);
    }

    #[tokio::test]
    async fn no_stored_points_returns_empty_series_not_an_error() {
        let store = seeded().await;
        let resp = query(&store, "exp1", Metric::GrowthRates, Duration::hours(1), 720).await.unwrap();
        assert!(resp.series.is_empty());
    }
}
