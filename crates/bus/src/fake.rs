// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory, synchronous `Bus` for tests — the bus-side counterpart
//! of [`rc_core::FakeClock`].

use crate::bus::{Bus, BusMessage};
use crate::error::BusError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

pub struct FakeBus {
    published: Mutex<Vec<BusMessage>>,
    tx: broadcast::Sender<BusMessage>,
    fail_confirm: AtomicBool,
}

impl FakeBus {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(256);
        Arc::new(Self { published: Mutex::new(Vec::new()), tx, fail_confirm: AtomicBool::new(false) })
    }

    /// Every message published so far, in order.
    pub fn published(&self) -> Vec<BusMessage> {
        self.published.lock().clone()
    }

    pub fn was_published_to(&self, topic: &str) -> bool {
        self.published.lock().iter().any(|m| m.topic == topic)
    }

    /// Make the next `publish_confirm` calls time out, to exercise the
    /// leader's HTTP-fallback path.
    pub fn simulate_confirm_timeouts(&self, fail: bool) {
        self.fail_confirm.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Bus for FakeBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError> {
        let msg = BusMessage { topic: topic.to_string(), payload: payload.to_vec() };
        self.published.lock().push(msg.clone());
        let _ = self.tx.send(msg);
        Ok(())
    }

    async fn publish_confirm(&self, topic: &str, payload: &[u8], timeout: Duration) -> Result<(), BusError> {
        if self.fail_confirm.load(Ordering::SeqCst) {
            return Err(BusError::ConfirmTimeout(timeout));
        }
        self.publish(topic, payload).await
    }

    fn subscribe(&self, _filter: &str) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_records_the_message() {
        let bus = FakeBus::new();
        bus.publish("pioreactor/u1/exp1/stirring/target_rpm/set", b"10").await.unwrap();
        assert!(bus.was_published_to("pioreactor/u1/exp1/stirring/target_rpm/set"));
    }

    #[tokio::test]
    async fn simulated_confirm_timeout_surfaces_the_right_error() {
        let bus = FakeBus::new();
        bus.simulate_confirm_timeouts(true);
        let err = bus.publish_confirm("t", b"x", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, BusError::ConfirmTimeout(_)));
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn subscriber_receives_subsequently_published_messages() {
        let bus = FakeBus::new();
        let mut rx = bus.subscribe("pioreactor/u1/#");
        bus.publish("pioreactor/u1/exp1/stirring/$state/set", b"ready").await.unwrap();
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.payload, b"ready");
    }
}
