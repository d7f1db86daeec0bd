// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform JSON error body (spec §7): `{"error": ..., "error_info": {...}}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    pub error_info: ErrorInfo,
}

impl ErrorEnvelope {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            error_info: ErrorInfo { cause: None, remediation: None, status },
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.error_info.cause = Some(cause.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.error_info.remediation = Some(remediation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_nested_error_info() {
        let env = ErrorEnvelope::new(409, "Experiment already exists").with_cause("duplicate primary key");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["error"], "Experiment already exists");
        assert_eq!(json["error_info"]["status"], 409);
        assert_eq!(json["error_info"]["cause"], "duplicate primary key");
        assert!(json["error_info"].get("remediation").is_none());
    }
}
