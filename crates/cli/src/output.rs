// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared text/JSON output formatting for `pios`/`pio` subcommands.

use crate::color;
use clap::ValueEnum;
use rc_wire::{TaskEnvelope, TaskStatus};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints a resolved (complete or failed) task envelope and reports
/// whether the overall invocation should be treated as a success.
pub fn print_task_result(envelope: &TaskEnvelope, format: OutputFormat) -> bool {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(envelope).unwrap_or_else(|_| "{}".to_string()));
            envelope.status == TaskStatus::Complete
        }
        OutputFormat::Text => match envelope.status {
            TaskStatus::Complete => {
                println!("{} {}", color::ok("done"), format_result_body(envelope.result.as_ref()));
                true
            }
            TaskStatus::Failed => {
                println!("{} {}", color::error("failed"), envelope.error.as_deref().unwrap_or("unknown error"));
                false
            }
            TaskStatus::InProgress | TaskStatus::PendingOrNotPresent => {
                println!("{} task {} still pending after the poll budget", color::error("timeout"), envelope.task_id);
                false
            }
        },
    }
}

fn format_result_body(result: Option<&Value>) -> String {
    let Some(value) = result else { return String::new() };
    match value.get("units") {
        Some(Value::Object(per_unit)) => {
            let mut lines = Vec::with_capacity(per_unit.len());
            for (unit, outcome) in per_unit {
                let ok = outcome.get("ok").and_then(Value::as_bool).unwrap_or(false);
                if ok {
                    lines.push(format!("{} {}", color::literal(unit), color::ok("ok")));
                } else {
                    let error = outcome.get("error").and_then(Value::as_str).unwrap_or("error");
                    lines.push(format!("{} {}: {error}", color::literal(unit), color::error("failed")));
                }
            }
            lines.join("\n")
        }
        _ => value.to_string(),
    }
}

/// `true` if a task-result envelope's per-unit aggregate (the
/// `{"units": {...}}` shape `aggregate_map` produces, spec §4.4)
/// contains at least one failure.
pub fn has_unit_failure(result: Option<&Value>) -> bool {
    let Some(Value::Object(per_unit)) = result.and_then(|v| v.get("units")) else { return false };
    per_unit.values().any(|outcome| !outcome.get("ok").and_then(Value::as_bool).unwrap_or(true))
}

pub fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()));
}
