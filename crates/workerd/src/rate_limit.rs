// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debounce cache for `POST /jobs/run/job_name/<job>` (spec §4.6: "Rate-
//! limited per job (debounce ≥ 1s)"). SPEC_FULL §9 resolves the open
//! question of window/scope: per-process, per-`(unit, job_name)`, a
//! 1-second sliding window.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Default)]
pub struct Debouncer {
    last_run: Mutex<HashMap<String, Instant>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(())` if `job_name` may run now, or `Err(remaining)`
    /// with the time left in the current window. Recording and
    /// checking happen atomically so two concurrent callers can't both
    /// observe a free window.
    pub fn check_and_record(&self, job_name: &str) -> Result<(), Duration> {
        let mut last_run = self.last_run.lock();
        let now = Instant::now();
        if let Some(previous) = last_run.get(job_name) {
            let elapsed = now.duration_since(*previous);
            if elapsed < DEBOUNCE_WINDOW {
                return Err(DEBOUNCE_WINDOW - elapsed);
            }
        }
        last_run.insert(job_name.to_string(), now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_is_always_allowed() {
        let debouncer = Debouncer::new();
        assert!(debouncer.check_and_record("stirring").is_ok());
    }

    #[test]
    fn a_second_run_within_the_window_is_rejected() {
        let debouncer = Debouncer::new();
        debouncer.check_and_record("stirring").unwrap();
        assert!(debouncer.check_and_record("stirring").is_err());
    }

    #[test]
    fn different_jobs_are_independent() {
        let debouncer = Debouncer::new();
        debouncer.check_and_record("stirring").unwrap();
        assert!(debouncer.check_and_record("od_reading").is_ok());
    }
}
