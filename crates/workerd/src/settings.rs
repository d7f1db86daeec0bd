// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Latest-known value per `(job_name, setting)`, fed by the worker's own
//! command topics (spec §4.6 `GET /jobs/settings/job_name/<job>[/setting/<k>]`
//! reads "the latest Bus-published value from a small local metadata
//! store"). Subscribing to its own `.../set` topics is the worker's only
//! way to observe settings without a real per-job process to ask.

use parking_lot::Mutex;
use rc_bus::{Bus, BusMessage};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct PublishedSettings {
    values: Arc<Mutex<HashMap<(String, String), serde_json::Value>>>,
}

impl PublishedSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job_name: &str, setting: &str) -> Option<serde_json::Value> {
        self.values.lock().get(&(job_name.to_string(), setting.to_string())).cloned()
    }

    pub fn for_job(&self, job_name: &str) -> HashMap<String, serde_json::Value> {
        self.values
            .lock()
            .iter()
            .filter(|((job, _), _)| job == job_name)
            .map(|((_, setting), value)| (setting.clone(), value.clone()))
            .collect()
    }

    fn record(&self, job_name: &str, setting: &str, value: serde_json::Value) {
        self.values.lock().insert((job_name.to_string(), setting.to_string()), value);
    }

    /// Spawns a task that subscribes to the bus and records every
    /// `pioreactor/<unit>/<experiment>/<job>/<setting>/set` message
    /// addressed to `unit`. Runs for the lifetime of the process.
    pub fn run_subscriber(&self, bus: Arc<dyn Bus>, unit: String) {
        let settings = self.clone();
        tokio::spawn(async move {
            let mut rx = bus.subscribe(&format!("pioreactor/{unit}/+/+/+/set"));
            loop {
                match rx.recv().await {
                    Ok(message) => settings.apply(&unit, &message),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn apply(&self, unit: &str, message: &BusMessage) {
        let Some((job_name, setting)) = parse_setting_topic(unit, &message.topic) else { return };
        if setting == "$state" {
            return;
        }
        let Ok(value) = serde_json::from_slice(&message.payload) else { return };
        self.record(&job_name, &setting, value);
    }
}

/// Parses `pioreactor/<unit>/<experiment>/<job>/<setting>/set`, returning
/// `(job, setting)` only when the topic is addressed to `unit`.
fn parse_setting_topic(unit: &str, topic: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = topic.split('/').collect();
    let [pioreactor, topic_unit, _experiment, job, setting, set] = parts[..] else { return None };
    if pioreactor != "pioreactor" || topic_unit != unit || set != "set" {
        return None;
    }
    Some((job.to_string(), setting.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_bus::FakeBus;

    #[test]
    fn parses_a_well_formed_setting_topic() {
        let parsed = parse_setting_topic("u1", "pioreactor/u1/exp1/stirring/target_rpm/set");
        assert_eq!(parsed, Some(("stirring".to_string(), "target_rpm".to_string())));
    }

    #[test]
    fn rejects_topics_for_other_units() {
        assert_eq!(parse_setting_topic("u1", "pioreactor/u2/exp1/stirring/target_rpm/set"), None);
    }

    #[test]
    fn rejects_malformed_topics() {
        assert_eq!(parse_setting_topic("u1", "pioreactor/u1/exp1/stirring/set"), None);
    }

    #[tokio::test]
    async fn apply_records_values_reachable_through_get() {
        let settings = PublishedSettings::new();
        let message = BusMessage { topic: "pioreactor/u1/exp1/stirring/target_rpm/set".to_string(), payload: b"10".to_vec() };
        settings.apply("u1", &message);
        assert_eq!(settings.get("stirring", "target_rpm"), Some(serde_json::json!(10)));
    }

    #[tokio::test]
    async fn run_subscriber_observes_published_messages() {
        let bus = FakeBus::new();
        let settings = PublishedSettings::new();
        settings.run_subscriber(bus.clone(), "u1".to_string());
        bus.publish("pioreactor/u1/exp1/stirring/target_rpm/set", b"12").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(settings.get("stirring", "target_rpm"), Some(serde_json::json!(12)));
    }
}
