// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rc-storage: the central SQLite-backed `Store` (leader-side) and the
//! worker-local active-calibration/estimator key/value maps.

mod error;
mod exec;
mod local_kv;
mod migrations;
mod store;

pub mod assignments;
pub mod config_history;
pub mod experiments;
pub mod logs;
pub mod timeseries;
pub mod workers;

pub use error::StoreError;
pub use exec::{Row, SqlValue};
pub use local_kv::LocalKv;
pub use store::Store;
