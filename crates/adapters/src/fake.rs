// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory stand-in for [`crate::UnitClient`], mirroring the
//! `FakeBus` pattern in `rc-bus`. Lets `rc-engine`/`rc-leaderd` tests
//! exercise orchestration logic without a network.

use crate::error::AdaptersError;
use crate::unit_client::Method;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub unit: String,
    pub method: Method,
    pub path: String,
    pub json: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum Canned {
    Ok(Value),
    Fail(u16, String),
    Timeout,
}

/// Queue-based fake: each unit has a queue of canned responses that
/// `call` drains in order, falling back to a default `Ok(Value::Null)`
/// once exhausted so tests don't need to script every call.
#[derive(Default)]
pub struct FakeUnitClient {
    responses: Mutex<HashMap<String, Vec<Canned>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeUnitClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, unit: impl Into<String>, response: Canned) {
        self.responses.lock().entry(unit.into()).or_default().push(response);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub async fn call(
        &self,
        unit: &str,
        method: Method,
        path: &str,
        json: Option<&Value>,
        _params: &[(&str, &str)],
        _timeout: Duration,
        _raw: bool,
    ) -> Result<Value, AdaptersError> {
        self.calls.lock().push(RecordedCall {
            unit: unit.to_string(),
            method,
            path: path.to_string(),
            json: json.cloned(),
        });

        let canned = {
            let mut responses = self.responses.lock();
            responses.get_mut(unit).filter(|q| !q.is_empty()).map(|q| q.remove(0))
        };

        match canned {
            Some(Canned::Ok(value)) => Ok(value),
            Some(Canned::Fail(status, body)) => {
                Err(AdaptersError::Http { unit: unit.to_string(), status, body })
            }
            Some(Canned::Timeout) => Err(AdaptersError::Timeout {
                unit: unit.to_string(),
                timeout: Duration::from_secs(5),
            }),
            None => Ok(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_drain_in_order() {
        let fake = FakeUnitClient::new();
        fake.queue("u1", Canned::Ok(Value::from(1)));
        fake.queue("u1", Canned::Ok(Value::from(2)));

        let first = fake.call("u1", Method::Get, "/unit_api/jobs/running", None, &[], Duration::from_secs(1), false).await.unwrap();
        let second = fake.call("u1", Method::Get, "/unit_api/jobs/running", None, &[], Duration::from_secs(1), false).await.unwrap();
        assert_eq!(first, Value::from(1));
        assert_eq!(second, Value::from(2));
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn unscripted_unit_gets_a_null_ok() {
        let fake = FakeUnitClient::new();
        let result = fake.call("u2", Method::Get, "/unit_api/jobs/running", None, &[], Duration::from_secs(1), false).await.unwrap();
        assert_eq!(result, Value::Null);
    }
}
