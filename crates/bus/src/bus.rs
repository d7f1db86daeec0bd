// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Bus` trait: topic-addressed pub/sub with at-least-once command
//! delivery and a bounded publish-confirm wait (spec §4.2).

use crate::error::BusError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// A message delivered to a subscriber.
#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Bound on how long a synchronous call site waits for a publish to be
/// acknowledged by the broker before treating it as unconfirmed
/// (spec §4.2: "~2s").
pub const DEFAULT_PUBLISH_CONFIRM_TIMEOUT: Duration = Duration::from_secs(2);

#[async_trait]
pub trait Bus: Send + Sync {
    /// Fire-and-forget publish; does not wait for broker acknowledgement.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError>;

    /// Publish and wait up to `timeout` for the broker to acknowledge
    /// delivery. Returns `Err(BusError::ConfirmTimeout)` if the window
    /// elapses first — callers (leaderd's Orchestrator) are expected to
    /// fall back to a direct HTTP command on that specific error
    /// (spec §4.2).
    async fn publish_confirm(&self, topic: &str, payload: &[u8], timeout: Duration) -> Result<(), BusError>;

    /// Subscribe to a topic filter, receiving every message published
    /// to a matching topic from this point forward.
    fn subscribe(&self, filter: &str) -> tokio::sync::broadcast::Receiver<BusMessage>;
}

/// Convenience: publish a JSON-serializable value with confirm using
/// the default timeout.
pub async fn publish_json_confirm<T: Serialize + Sync>(bus: &dyn Bus, topic: &str, value: &T) -> Result<(), BusError> {
    let payload = serde_json::to_vec(value).map_err(|e| BusError::Connection(e.to_string()))?;
    bus.publish_confirm(topic, &payload, DEFAULT_PUBLISH_CONFIRM_TIMEOUT).await
}
