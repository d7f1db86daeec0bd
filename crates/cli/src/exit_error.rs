// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code (spec §6:
//! "0 on success, 1 on confirmation abort or any partial failure in
//! fan-out"). Commands return `ExitError` instead of calling
//! `std::process::exit()` directly, so `main()` is the only place the
//! process actually terminates.

use std::fmt;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn aborted() -> Self {
        Self::new(1, "aborted")
    }

    pub fn partial_failure(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
