// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! HTTP bridge from the leader to the per-unit worker API (spec §4.3,
//! §4.4): a single-call [`UnitClient`] plus the [`Multicaster`] that
//! fans a call out across many units and aggregates the results.

mod error;
mod multicaster;
mod resolver;
mod unit_client;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use error::AdaptersError;
pub use multicaster::{Multicaster, MulticastResult, Payload, UnitOutcome};
pub use resolver::{MdnsResolver, TableResolver, UnitResolver};
pub use unit_client::{Body, Method, UnitClient, ARCHIVE_TIMEOUT, DEFAULT_GET_TIMEOUT, DEFAULT_MUTATE_TIMEOUT};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{Canned, FakeUnitClient, RecordedCall};
