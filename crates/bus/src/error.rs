// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus connection error: {0}")]
    Connection(String),
    #[error("publish-confirm timed out after {0:?}")]
    ConfirmTimeout(std::time::Duration),
}
