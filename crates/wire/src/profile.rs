// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment-profile YAML validation (spec §4.7
//! `/contrib/experiment_profiles`).
//!
//! Profiles describe a scripted sequence of job starts/stops/setting
//! changes to run across a set of units. We validate structurally
//! against a fixed schema rather than executing anything here —
//! execution is the Orchestrator's job, not this crate's.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("not a portable .yaml/.yml filename: {0:?}")]
    BadFilename(String),
    #[error("invalid YAML: {0}")]
    Yaml(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAction {
    pub r#type: String,
    #[serde(default)]
    pub hours_elapsed: Option<f64>,
    #[serde(default)]
    pub options: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileJob {
    #[serde(default)]
    pub actions: Vec<ProfileAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUnit {
    #[serde(default)]
    pub jobs: IndexMap<String, ProfileJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentProfile {
    pub experiment_profile_name: String,
    #[serde(default)]
    pub experiment_profile_description: Option<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub common: Option<ProfileUnit>,
    #[serde(default)]
    pub pioreactors: IndexMap<String, ProfileUnit>,
}

/// Validate a profile's filename and body together; returns the parsed
/// document on success so callers can also act on its fields.
pub fn validate_experiment_profile(filename: &str, raw: &str) -> Result<ExperimentProfile, ProfileError> {
    if !crate::filename::is_profile_filename(filename) {
        return Err(ProfileError::BadFilename(filename.to_string()));
    }
    let profile: ExperimentProfile = serde_yaml::from_str(raw).map_err(|e| ProfileError::Yaml(e.to_string()))?;
    if profile.experiment_profile_name.trim().is_empty() {
        return Err(ProfileError::MissingField("experiment_profile_name"));
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "experiment_profile_name: demo\npioreactors:\n  worker1:\n    jobs:\n      stirring:\n        actions:\n          - type: start\n            hours_elapsed: 0\n";

    #[test]
    fn accepts_minimal_profile() {
        let profile = validate_experiment_profile("demo.yaml", MINIMAL).expect("should parse");
        assert_eq!(profile.experiment_profile_name, "demo");
        assert_eq!(profile.pioreactors["worker1"].jobs["stirring"].actions.len(), 1);
    }

    #[test]
    fn rejects_non_yaml_filename() {
        assert!(validate_experiment_profile("demo.json", MINIMAL).is_err());
    }

    #[test]
    fn rejects_missing_name() {
        let err = validate_experiment_profile("demo.yaml", "pioreactors: {}\n").unwrap_err();
        assert!(matches!(err, ProfileError::MissingField(_)));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(validate_experiment_profile("demo.yaml", "not: [valid").is_err());
    }
}
