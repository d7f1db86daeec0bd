// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fans one logical call out to many units concurrently and aggregates
//! per-unit outcomes (spec §4.4). `Multicaster` itself only produces
//! the aggregated result; wrapping that into a pollable `Task` is
//! `rc-engine::TaskQueue`'s job, so this crate has no dependency on
//! the engine and the direction of the dependency graph stays acyclic.

use crate::error::AdaptersError;
use crate::unit_client::{Body, Method, UnitClient};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// The payload sent to each target unit.
pub enum Payload {
    None,
    /// The same JSON body sent to every unit.
    Shared(Value),
    /// One JSON body per unit, positionally parallel to the `units`
    /// slice passed to `multicast` (spec §4.4: "every worker needs its
    /// own env").
    PerUnit(Vec<Value>),
}

/// Outcome of a single unit's call, when it produced a response at all.
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    pub ok: bool,
    pub body: Option<Value>,
    pub error: Option<String>,
}

/// `unit -> outcome`; `None` means no response came back at all
/// (timeout or connection failure), distinct from an HTTP error
/// response which is `Some(UnitOutcome { ok: false, .. })`.
pub type MulticastResult = HashMap<String, Option<UnitOutcome>>;

pub struct Multicaster {
    client: Arc<UnitClient>,
}

impl Multicaster {
    pub fn new(client: Arc<UnitClient>) -> Self {
        Self { client }
    }

    /// Fan out `method path` to every unit in `units`, with an overall
    /// timeout applied per-call (spec §4.4, §5: "overall timeout ≥ the
    /// per-call timeout" — here they're the same bound since each call
    /// runs independently and concurrently).
    pub async fn multicast(
        &self,
        method: Method,
        path: &str,
        units: &[String],
        payload: Payload,
        timeout: Duration,
        raw: bool,
    ) -> MulticastResult {
        let payloads = expand_payload(payload, units.len());
        let mut handles = Vec::with_capacity(units.len());
        for (i, unit) in units.iter().enumerate() {
            let client = self.client.clone();
            let unit = unit.clone();
            let path = path.to_string();
            let json = payloads.get(i).cloned().flatten();
            handles.push(tokio::spawn(async move {
                let result = client.call(&unit, method, &path, json.as_ref(), &[], timeout, raw).await;
                (unit, result)
            }));
        }

        let mut out: MulticastResult = HashMap::with_capacity(units.len());
        for handle in handles {
            match handle.await {
                Ok((unit, Ok(body))) => {
                    out.insert(unit, Some(UnitOutcome { ok: true, body: body_to_value(body), error: None }));
                }
                Ok((unit, Err(AdaptersError::Http { status, body, .. }))) => {
                    out.insert(
                        unit,
                        Some(UnitOutcome {
                            ok: false,
                            body: serde_json::from_str(&body).ok(),
                            error: Some(format!("HTTP {status}")),
                        }),
                    );
                }
                Ok((unit, Err(AdaptersError::Timeout { .. } | AdaptersError::Transport { .. }))) => {
                    out.insert(unit, None);
                }
                Ok((unit, Err(other))) => {
                    out.insert(unit, Some(UnitOutcome { ok: false, body: None, error: Some(other.to_string()) }));
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "multicast task panicked");
                }
            }
        }
        out
    }
}

fn body_to_value(body: Body) -> Option<Value> {
    match body {
        Body::Json(v) => Some(v),
        Body::Raw(bytes) => Some(Value::String(format!("<{} bytes>", bytes.len()))),
    }
}

fn expand_payload(payload: Payload, n: usize) -> Vec<Option<Value>> {
    match payload {
        Payload::None => vec![None; n],
        Payload::Shared(v) => vec![Some(v); n],
        Payload::PerUnit(values) => values.into_iter().map(Some).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TableResolver;

    #[tokio::test]
    async fn unresolvable_units_surface_as_failed_not_none() {
        let client = Arc::new(UnitClient::new(Arc::new(TableResolver::new())));
        let mc = Multicaster::new(client);
        let result = mc
            .multicast(
                Method::Get,
                "/unit_api/jobs/running",
                &["ghost".to_string()],
                Payload::None,
                Duration::from_millis(100),
                false,
            )
            .await;
        let outcome = result.get("ghost").unwrap().as_ref().unwrap();
        assert!(!outcome.ok);
    }

    #[tokio::test]
    async fn per_unit_payload_expansion_is_positional() {
        let payloads = expand_payload(
            Payload::PerUnit(vec![Value::from(1), Value::from(2)]),
            2,
        );
        assert_eq!(payloads, vec![Some(Value::from(1)), Some(Value::from(2))]);
    }

    #[tokio::test]
    async fn shared_payload_expands_to_every_unit() {
        let payloads = expand_payload(Payload::Shared(Value::from(true)), 3);
        assert_eq!(payloads.len(), 3);
        assert!(payloads.iter().all(|p| *p == Some(Value::from(true))));
    }
}
