// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log records and the level-floor semantics used by log queries.

use crate::experiment::ExperimentId;
use crate::unit::UnitId;
use serde::{Deserialize, Serialize};

/// Severity of a log record, ordered loosely from most to least severe.
///
/// A `min_level` query floor expands to an ordered subset: `ERROR` alone is
/// the narrowest floor, `DEBUG` the widest (`ERROR ⊂ WARNING ⊂ NOTICE ⊂
/// INFO ⊂ DEBUG`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    /// All levels at least as severe as `self` (inclusive), widest-to-narrowest
    /// order matching the severity floor semantics in the data model.
    pub fn at_least(self) -> &'static [LogLevel] {
        use LogLevel::*;
        match self {
            Error => &[Error],
            Warning => &[Error, Warning],
            Notice => &[Error, Warning, Notice],
            Info => &[Error, Warning, Notice, Info],
            Debug => &[Error, Warning, Notice, Info, Debug],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARNING" => Ok(LogLevel::Warning),
            "NOTICE" => Ok(LogLevel::Notice),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// A single log entry attributed to a unit and an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub pioreactor_unit: UnitId,
    pub experiment: ExperimentId,
    pub task: String,
    pub source: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_subsets_are_nested() {
        assert_eq!(LogLevel::Error.at_least(), &[LogLevel::Error]);
        assert!(LogLevel::Warning.at_least().contains(&LogLevel::Error));
        assert!(LogLevel::Debug.at_least().contains(&LogLevel::Error));
        assert!(LogLevel::Debug.at_least().contains(&LogLevel::Info));
        assert_eq!(LogLevel::Debug.at_least().len(), 5);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("bogus".parse::<LogLevel>().is_err());
    }
}
