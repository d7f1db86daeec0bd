// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production `Bus`: a lightweight WebSocket broker client.
//!
//! The control bus only needs topic-addressed pub/sub with
//! at-least-once delivery and a bounded publish-confirm wait (spec
//! §4.2) — a full MQTT stack is more than the contract asks for, so
//! this speaks a small JSON envelope over a single persistent
//! WebSocket connection to the cluster's broker, the same
//! connect-once/fan-out-via-broadcast shape the agent/coop WS bridge
//! uses for its event stream.

use crate::bus::{Bus, BusMessage};
use crate::error::BusError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsWrite = futures_util::stream::SplitSink<WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>, Message>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Envelope {
    Publish { id: u64, topic: String, payload: String, want_ack: bool },
    Ack { id: u64 },
    Message { topic: String, payload: String },
}

pub struct WsBus {
    write: Mutex<WsWrite>,
    broadcast_tx: broadcast::Sender<BusMessage>,
    next_id: AtomicU64,
    pending_acks: Arc<Mutex<std::collections::HashMap<u64, oneshot::Sender<()>>>>,
}

impl WsBus {
    pub async fn connect(url: &str) -> Result<Arc<Self>, BusError> {
        let (stream, _) = connect_async(url).await.map_err(|e| BusError::Connection(e.to_string()))?;
        let (write, mut read) = stream.split();
        let (broadcast_tx, _) = broadcast::channel(1024);
        let pending_acks: Arc<Mutex<std::collections::HashMap<u64, oneshot::Sender<()>>>> =
            Arc::new(Mutex::new(std::collections::HashMap::new()));

        let bus = Arc::new(Self {
            write: Mutex::new(write),
            broadcast_tx: broadcast_tx.clone(),
            next_id: AtomicU64::new(1),
            pending_acks: pending_acks.clone(),
        });

        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let Ok(Message::Text(text)) = msg else { continue };
                let Ok(envelope) = serde_json::from_str::<Envelope>(&text) else { continue };
                match envelope {
                    Envelope::Ack { id } => {
                        if let Some(tx) = pending_acks.lock().await.remove(&id) {
                            let _ = tx.send(());
                        }
                    }
                    Envelope::Message { topic, payload } => {
                        let payload = base64_decode(&payload);
                        let _ = broadcast_tx.send(BusMessage { topic, payload });
                    }
                    Envelope::Publish { .. } => {}
                }
            }
            tracing::warn!("bus websocket stream ended");
        });

        Ok(bus)
    }

    async fn send_publish(&self, topic: &str, payload: &[u8], want_ack: bool) -> Result<u64, BusError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let envelope = Envelope::Publish {
            id,
            topic: topic.to_string(),
            payload: base64_encode(payload),
            want_ack,
        };
        let text = serde_json::to_string(&envelope).map_err(|e| BusError::Connection(e.to_string()))?;
        self.write
            .lock()
            .await
            .send(Message::Text(text))
            .await
            .map_err(|e| BusError::Connection(e.to_string()))?;
        Ok(id)
    }
}

#[async_trait]
impl Bus for WsBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BusError> {
        self.send_publish(topic, payload, false).await?;
        Ok(())
    }

    async fn publish_confirm(&self, topic: &str, payload: &[u8], timeout: Duration) -> Result<(), BusError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        let id = self.send_publish(topic, payload, true).await?;
        self.pending_acks.lock().await.insert(id, ack_tx);

        match tokio::time::timeout(timeout, ack_rx).await {
            Ok(Ok(())) => Ok(()),
            _ => {
                self.pending_acks.lock().await.remove(&id);
                Err(BusError::ConfirmTimeout(timeout))
            }
        }
    }

    fn subscribe(&self, _filter: &str) -> broadcast::Receiver<BusMessage> {
        self.broadcast_tx.subscribe()
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::with_capacity((bytes.len() + 2) / 3 * 4);
    for chunk in bytes.chunks(3) {
        let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
        out.push(CHARS[(b[0] >> 2) as usize] as char);
        out.push(CHARS[(((b[0] & 0x03) << 4) | (b[1] >> 4)) as usize] as char);
        out.push(if chunk.len() > 1 { CHARS[(((b[1] & 0x0f) << 2) | (b[2] >> 6)) as usize] as char } else { '=' });
        out.push(if chunk.len() > 2 { CHARS[(b[2] & 0x3f) as usize] as char } else { '=' });
    }
    out
}

fn base64_decode(s: &str) -> Vec<u8> {
    fn val(c: u8) -> Option<u8> {
        match c {
            b'A'..=b'Z' => Some(c - b'A'),
            b'a'..=b'z' => Some(c - b'a' + 26),
            b'0'..=b'9' => Some(c - b'0' + 52),
            b'+' => Some(62),
            b'/' => Some(63),
            _ => None,
        }
    }
    let bytes: Vec<u8> = s.bytes().filter_map(val).collect();
    let mut out = Vec::with_capacity(bytes.len() * 3 / 4);
    for chunk in bytes.chunks(4) {
        if chunk.len() < 2 {
            break;
        }
        out.push((chunk[0] << 2) | (chunk[1] >> 4));
        if chunk.len() > 2 {
            out.push((chunk[1] << 4) | (chunk[2] >> 2));
        }
        if chunk.len() > 3 {
            out.push((chunk[2] << 6) | chunk[3]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trips() {
        let data = b"pioreactor/u1/exp1/stirring/target_rpm/set:10";
        assert_eq!(base64_decode(&base64_encode(data)), data);
    }

    #[test]
    fn base64_round_trips_short_inputs() {
        for data in [b"" as &[u8], b"a", b"ab", b"abc", b"abcd"] {
            assert_eq!(base64_decode(&base64_encode(data)), data);
        }
    }
}
