// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pios`: the leader-facing half of the CLI bridge (spec §6). Every
//! subcommand tokenizes its own free-form tail with `rc_shell`,
//! translates targeting flags into the wildcards the leader's
//! `Targeter`/`Orchestrator` already understand (`$broadcast`,
//! `$experiment`), and polls the returned task to completion before
//! printing a result and picking an exit code.

use crate::client::HttpClient;
use crate::commands::{confirm, rejoin_trailing};
use crate::exit_error::ExitError;
use crate::output::{has_unit_failure, print_json, print_task_result, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use rc_core::universal::{UNIVERSAL_EXPERIMENT, UNIVERSAL_IDENTIFIER};
use rc_wire::run_job::RunJobPayload;
use rc_wire::TaskEnvelope;
use serde_json::{json, Value};
use std::time::Duration;

const POLL_BUDGET: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
#[command(name = "pios", about = "Cluster control-plane CLI (leader-facing)")]
pub struct PiosCli {
    /// Base URL of the leader's `/api` HTTP surface.
    #[arg(long, env = "RC_LEADER_URL", default_value = "http://leader:4999")]
    pub leader_url: String,

    #[command(subcommand)]
    pub command: PiosCommand,
}

#[derive(Debug, Subcommand)]
pub enum PiosCommand {
    /// Run a job on one or more units within one or more experiments.
    Run {
        job: String,
        #[arg(long = "units")]
        units: Vec<String>,
        #[arg(long = "experiments")]
        experiments: Vec<String>,
        #[arg(long)]
        json: bool,
        #[arg(short = 'y', long)]
        yes: bool,
        /// Job-specific flags, e.g. `--target-rpm 10 --skip-first-run`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },
    /// Stop matching job(s).
    Kill {
        #[arg(long = "job-name", visible_alias = "job")]
        job_name: Option<String>,
        #[arg(long)]
        experiment: Option<String>,
        #[arg(long = "all-jobs")]
        all_jobs: bool,
        #[arg(long = "units")]
        units: Vec<String>,
        #[arg(long)]
        json: bool,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Push the shared and/or per-unit config to the cluster.
    #[command(name = "sync-configs")]
    SyncConfigs {
        #[arg(long)]
        shared: bool,
        #[arg(long)]
        specific: bool,
        #[arg(long = "skip-save")]
        skip_save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Trigger a software update task.
    Update {
        #[arg(value_enum)]
        target: UpdateTarget,
        #[arg(short = 'b', long)]
        branch: Option<String>,
        #[arg(short = 'v', long)]
        version: Option<String>,
        #[arg(short = 's', long)]
        source: Option<String>,
        #[arg(short = 'r', long)]
        repo: Option<String>,
        #[arg(long = "units")]
        units: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Install or uninstall a plugin across the cluster.
    Plugins {
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Copy a file to the leader's data directory.
    Cp { path: String },
    /// Remove a file from the leader's data directory.
    Rm { path: String },
    /// Reboot targeted units.
    Reboot {
        #[arg(long = "units")]
        units: Vec<String>,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Shut down targeted units.
    Shutdown {
        #[arg(long = "units")]
        units: Vec<String>,
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UpdateTarget {
    App,
    Ui,
}

#[derive(Debug, Subcommand)]
pub enum PluginAction {
    Install {
        name: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long = "units")]
        units: Vec<String>,
    },
    Uninstall {
        name: String,
        #[arg(long = "units")]
        units: Vec<String>,
    },
}

fn with_default(units: Vec<String>) -> Vec<String> {
    if units.is_empty() {
        vec![UNIVERSAL_IDENTIFIER.to_string()]
    } else {
        units
    }
}

fn experiments_or_universal(experiments: Vec<String>) -> Vec<String> {
    if experiments.is_empty() {
        vec![UNIVERSAL_EXPERIMENT.to_string()]
    } else {
        experiments
    }
}

/// Runs one `pios` invocation end-to-end and returns the process exit
/// code (spec §6: "0 on success, 1 on confirmation abort or any
/// partial failure in fan-out").
pub async fn dispatch(cli: PiosCli) -> anyhow::Result<i32> {
    let client = HttpClient::new(cli.leader_url);
    match cli.command {
        PiosCommand::Run { job, units, experiments, json, yes, extra } => {
            run_job(&client, &job, with_default(units), experiments_or_universal(experiments), &extra, json, yes).await
        }
        PiosCommand::Kill { job_name, experiment, all_jobs, units, json, yes } => {
            kill(&client, job_name, experiment, all_jobs, with_default(units), json, yes).await
        }
        PiosCommand::SyncConfigs { shared, specific, skip_save, json } => sync_configs(&client, shared, specific, skip_save, json).await,
        PiosCommand::Update { target, branch, version, source, repo, units, json } => {
            update(&client, target, branch, version, source, repo, with_default(units), json).await
        }
        PiosCommand::Plugins { action } => plugins(&client, action).await,
        PiosCommand::Cp { path } => cp(&client, &path).await,
        PiosCommand::Rm { path } => rm(&client, &path).await,
        PiosCommand::Reboot { units, yes } => power(&client, with_default(units), yes, "reboot").await,
        PiosCommand::Shutdown { units, yes } => power(&client, with_default(units), yes, "shutdown").await,
    }
}

async fn poll_and_print(client: &HttpClient, envelope: Value, format: OutputFormat) -> anyhow::Result<bool> {
    let envelope: TaskEnvelope = serde_json::from_value(envelope)?;
    let resolved = client.poll_task(envelope, POLL_BUDGET).await?;
    let success = print_task_result(&resolved, format);
    Ok(success && !has_unit_failure(resolved.result.as_ref()))
}

async fn run_job(
    client: &HttpClient,
    job: &str,
    units: Vec<String>,
    experiments: Vec<String>,
    extra: &[String],
    json_out: bool,
    yes: bool,
) -> anyhow::Result<i32> {
    let format = if json_out { OutputFormat::Json } else { OutputFormat::Text };
    let tail = rejoin_trailing(extra);
    let invocation = rc_shell::parse_invocation(&rc_shell::tokenize(&tail)?)?;
    let payload =
        RunJobPayload { args: invocation.args, options: invocation.options, env: invocation.env, config_overrides: invocation.config_overrides };

    if !confirm(&format!("Run {job} on {}?", units.join(",")), yes || json_out) {
        return Err(ExitError::aborted().into());
    }

    let mut all_ok = true;
    for unit in &units {
        for experiment in &experiments {
            let path = format!("/api/workers/{unit}/jobs/{experiment}/{job}");
            let envelope = client.send_json(reqwest::Method::POST, &path, &payload).await?;
            all_ok &= poll_and_print(client, envelope, format).await?;
        }
    }
    Ok(if all_ok { 0 } else { 1 })
}

async fn kill(
    client: &HttpClient,
    job_name: Option<String>,
    experiment: Option<String>,
    all_jobs: bool,
    units: Vec<String>,
    json_out: bool,
    yes: bool,
) -> anyhow::Result<i32> {
    let format = if json_out { OutputFormat::Json } else { OutputFormat::Text };
    if !confirm(&format!("Stop jobs on {}?", units.join(",")), yes || json_out) {
        return Err(ExitError::aborted().into());
    }

    let mut all_ok = true;
    for unit in &units {
        let envelope = if all_jobs {
            client.post(&format!("/api/workers/{unit}/jobs/stop_all")).await?
        } else {
            let job = job_name.clone().ok_or_else(|| anyhow::anyhow!("--job-name is required unless --all-jobs is set"))?;
            let experiment = experiment.clone().unwrap_or_else(|| UNIVERSAL_EXPERIMENT.to_string());
            let path = format!("/api/workers/{unit}/jobs/{experiment}/{job}");
            client.send_json(reqwest::Method::DELETE, &path, &Value::Null).await?
        };
        if all_jobs {
            all_ok &= poll_and_print(client, envelope, format).await?;
        } else {
            // The single-unit stop route replies synchronously, not via a task envelope.
            if format == OutputFormat::Json {
                print_json(&envelope);
            } else {
                println!("{}", crate::color::ok("stopped"));
            }
        }
    }
    Ok(if all_ok { 0 } else { 1 })
}

async fn sync_configs(client: &HttpClient, shared: bool, specific: bool, _skip_save: bool, json_out: bool) -> anyhow::Result<i32> {
    let format = if json_out { OutputFormat::Json } else { OutputFormat::Text };
    let filenames: Vec<&str> = match (shared, specific) {
        (false, false) => vec!["config.ini"],
        (true, false) => vec!["config.ini"],
        (false, true) => vec![],
        (true, true) => vec!["config.ini"],
    };
    if filenames.is_empty() {
        println!("nothing to sync for --specific alone (per-unit configs sync automatically on write)");
        return Ok(0);
    }
    let mut all_ok = true;
    for filename in filenames {
        let current = client.get(&format!("/api/configs/{filename}")).await?;
        let code = current.get("code").and_then(Value::as_str).unwrap_or_default();
        let body = json!({ "code": code, "targets": { "active_only": true } });
        let envelope = client.send_json(reqwest::Method::PATCH, &format!("/api/configs/{filename}"), &body).await?;
        all_ok &= poll_and_print(client, envelope, format).await?;
    }
    Ok(if all_ok { 0 } else { 1 })
}

async fn update(
    client: &HttpClient,
    target: UpdateTarget,
    branch: Option<String>,
    version: Option<String>,
    source: Option<String>,
    repo: Option<String>,
    units: Vec<String>,
    json_out: bool,
) -> anyhow::Result<i32> {
    let format = if json_out { OutputFormat::Json } else { OutputFormat::Text };
    let target_str = match target {
        UpdateTarget::App => "app",
        UpdateTarget::Ui => "ui",
    };
    let mut all_ok = true;
    let body = json!({ "branch": branch, "version": version, "source": source, "repo": repo });
    for unit in &units {
        let envelope = client.send_json(reqwest::Method::POST, &format!("/api/workers/{unit}/system/update/{target_str}"), &body).await?;
        all_ok &= poll_and_print(client, envelope, format).await?;
    }
    Ok(if all_ok { 0 } else { 1 })
}

async fn plugins(client: &HttpClient, action: PluginAction) -> anyhow::Result<i32> {
    let format = OutputFormat::Text;
    let (units, body, path_suffix) = match action {
        PluginAction::Install { name, source, units } => (units, json!({ "name": name, "source": source }), "install"),
        PluginAction::Uninstall { name, units } => (units, json!({ "name": name }), "uninstall"),
    };
    let units = with_default(units);
    let mut all_ok = true;
    for unit in &units {
        let envelope = client.send_json(reqwest::Method::POST, &format!("/api/workers/{unit}/plugins/{path_suffix}"), &body).await?;
        all_ok &= poll_and_print(client, envelope, format).await?;
    }
    Ok(if all_ok { 0 } else { 1 })
}

async fn cp(client: &HttpClient, path: &str) -> anyhow::Result<i32> {
    let content = tokio::fs::read_to_string(path).await?;
    let name = std::path::Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or("upload.bin");
    let response = client.send_json(reqwest::Method::POST, "/api/system/upload", &json!({ "filename": name, "content": content })).await?;
    print_json(&response);
    Ok(0)
}

async fn rm(client: &HttpClient, path: &str) -> anyhow::Result<i32> {
    let response = client.send_json(reqwest::Method::POST, "/api/system/remove_file", &json!({ "path": path })).await?;
    print_json(&response);
    Ok(0)
}

async fn power(client: &HttpClient, units: Vec<String>, yes: bool, action: &str) -> anyhow::Result<i32> {
    if !confirm(&format!("{action} {}?", units.join(",")), yes) {
        return Err(ExitError::aborted().into());
    }
    let mut all_ok = true;
    for unit in &units {
        let envelope = client.post(&format!("/api/workers/{unit}/system/{action}")).await?;
        all_ok &= poll_and_print(client, envelope, OutputFormat::Text).await?;
    }
    Ok(if all_ok { 0 } else { 1 })
}
