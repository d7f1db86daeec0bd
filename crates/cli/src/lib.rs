// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rc-cli: the `pios`/`pio` command-line bridge (spec §6, §4.10) —
//! thin HTTP clients over `leaderd`'s `/api` and `workerd`'s
//! `/unit_api` surfaces, sharing job-flag parsing with `rc-shell`.

pub mod client;
pub mod color;
pub mod commands;
pub mod exit_error;
pub mod output;

pub use exit_error::ExitError;
