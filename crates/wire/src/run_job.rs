// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The run-job payload (spec §6) posted to
//! `POST /unit_api/jobs/run/job_name/<job>`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a job-run request. `options` preserves insertion order
/// (`IndexMap`) since some job CLIs are order-sensitive about
/// repeated/overriding flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunJobPayload {
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
    #[serde(default)]
    pub config_overrides: Vec<(String, String, String)>,
}

impl RunJobPayload {
    /// Render `options` as `--flag value` / `--flag` (boolean true) CLI
    /// tokens, in insertion order, for handoff to the shell lexer.
    pub fn options_as_flags(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (flag, value) in &self.options {
            match value {
                Value::Bool(true) => out.push(format!("--{flag}")),
                Value::Bool(false) => {}
                Value::Null => out.push(format!("--{flag}")),
                Value::String(s) => {
                    out.push(format!("--{flag}"));
                    out.push(s.clone());
                }
                other => {
                    out.push(format!("--{flag}"));
                    out.push(other.to_string());
                }
            }
        }
        out
    }

    /// Merge the standard environment the leader always injects
    /// (EXPERIMENT, MODEL_NAME, MODEL_VERSION, HOSTNAME, ACTIVE) on top
    /// of caller-supplied env, with standard keys winning.
    pub fn with_standard_env(
        mut self,
        experiment: &str,
        hostname: &str,
        active: bool,
        model_name: Option<&str>,
        model_version: Option<&str>,
    ) -> Self {
        self.env.insert("EXPERIMENT".to_string(), experiment.to_string());
        self.env.insert("HOSTNAME".to_string(), hostname.to_string());
        self.env.insert("ACTIVE".to_string(), if active { "1" } else { "0" }.to_string());
        if let Some(name) = model_name {
            self.env.insert("MODEL_NAME".to_string(), name.to_string());
        }
        if let Some(version) = model_version {
            self.env.insert("MODEL_VERSION".to_string(), version.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_all_fields_defaulted() {
        let payload: RunJobPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.args.is_empty());
        assert!(payload.options.is_empty());
    }

    #[test]
    fn standard_env_overrides_caller_supplied_keys() {
        let mut payload = RunJobPayload::default();
        payload.env.insert("EXPERIMENT".to_string(), "stale".to_string());
        let payload = payload.with_standard_env("exp1", "unit-1", true, Some("Pioreactor 20ml"), None);
        assert_eq!(payload.env.get("EXPERIMENT").map(String::as_str), Some("exp1"));
        assert_eq!(payload.env.get("ACTIVE").map(String::as_str), Some("1"));
        assert_eq!(payload.env.get("HOSTNAME").map(String::as_str), Some("unit-1"));
        assert_eq!(payload.env.get("MODEL_NAME").map(String::as_str), Some("Pioreactor 20ml"));
        assert!(!payload.env.contains_key("MODEL_VERSION"));
    }

    #[test]
    fn options_as_flags_renders_bool_and_string_values() {
        let mut payload = RunJobPayload::default();
        payload.options.insert("skip-first-run".to_string(), Value::Bool(true));
        payload.options.insert("target-rpm".to_string(), Value::String("10".to_string()));
        payload.options.insert("verbose".to_string(), Value::Bool(false));
        assert_eq!(
            payload.options_as_flags(),
            vec!["--skip-first-run", "--target-rpm", "10"]
        );
    }
}
