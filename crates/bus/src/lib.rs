// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control bus: topic-addressed pub/sub between leaderd and the
//! workers (spec §4.2). [`Bus`] is the abstraction both production
//! code and tests program against; [`WsBus`] is the real WebSocket
//! client, [`FakeBus`] the in-memory test double.

mod bus;
mod error;
mod fake;
mod topics;
mod ws;

pub use bus::{publish_json_confirm, Bus, BusMessage, DEFAULT_PUBLISH_CONFIRM_TIMEOUT};
pub use error::BusError;
pub use fake::FakeBus;
pub use topics::{flicker, logs, setting_set, state_set, JobState};
pub use ws::WsBus;
