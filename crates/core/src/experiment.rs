// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Experiment identifier and name validation.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

const MAX_NAME_LEN: usize = 199;
const DISALLOWED_CHARS: [char; 6] = ['#', '$', '%', '+', '/', '\\'];

/// Named logical context to which workers may be assigned and within which jobs run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperimentId(pub String);

impl ExperimentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_universal(&self) -> bool {
        crate::universal::is_universal_experiment(&self.0)
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ExperimentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExperimentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ExperimentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Why a proposed experiment name was rejected.
///
/// Mirrors the validation order of the original leader API so error messages
/// stay stable for UI callers that pattern-match on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExperimentNameError {
    #[error("Experiment name is required")]
    Empty,
    #[error("Experiment name is too long")]
    TooLong,
    #[error("Experiment name cannot be 'current'")]
    ReservedCurrent,
    #[error("Experiment name cannot start with '_testing'")]
    ReservedTestingPrefix,
    #[error("Experiment name cannot contain special characters (#, $, %, +, /, \\)")]
    DisallowedCharacters,
}

/// Validate a proposed experiment name against the rules in the data model.
pub fn validate_experiment_name(name: &str) -> Result<(), ExperimentNameError> {
    if name.is_empty() {
        return Err(ExperimentNameError::Empty);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ExperimentNameError::TooLong);
    }
    if name.eq_ignore_ascii_case("current") {
        return Err(ExperimentNameError::ReservedCurrent);
    }
    if name.starts_with("_testing") {
        return Err(ExperimentNameError::ReservedTestingPrefix);
    }
    if name.contains(DISALLOWED_CHARS.as_slice()) {
        return Err(ExperimentNameError::DisallowedCharacters);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_plain_name() {
        assert!(validate_experiment_name("exp1").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(validate_experiment_name(""), Err(ExperimentNameError::Empty));
    }

    #[test]
    fn rejects_name_at_200_chars() {
        let name = "a".repeat(200);
        assert_eq!(validate_experiment_name(&name), Err(ExperimentNameError::TooLong));
    }

    #[test]
    fn accepts_name_at_199_chars() {
        let name = "a".repeat(199);
        assert!(validate_experiment_name(&name).is_ok());
    }

    #[test]
    fn rejects_reserved_current_case_insensitively() {
        assert_eq!(
            validate_experiment_name("Current"),
            Err(ExperimentNameError::ReservedCurrent)
        );
    }

    #[test]
    fn rejects_testing_prefix() {
        assert_eq!(
            validate_experiment_name("_testing_foo"),
            Err(ExperimentNameError::ReservedTestingPrefix)
        );
    }

    #[test]
    fn rejects_each_disallowed_character() {
        for ch in DISALLOWED_CHARS {
            let name = format!("exp{ch}1");
            assert_eq!(
                validate_experiment_name(&name),
                Err(ExperimentNameError::DisallowedCharacters),
                "expected {ch:?} to be rejected"
            );
        }
    }
}
