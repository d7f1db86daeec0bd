// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pio`: the worker-local half of the CLI bridge (spec §4.10, §6) —
//! symmetric to `pios` but talks to the local `workerd` over loopback
//! instead of fanning a request out across the cluster.

use crate::client::HttpClient;
use crate::commands::{confirm, rejoin_trailing};
use crate::exit_error::ExitError;
use crate::output::{print_json, print_task_result, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use rc_wire::run_job::RunJobPayload;
use serde_json::{json, Value};
use std::time::Duration;

const POLL_BUDGET: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
#[command(name = "pio", about = "Worker-local control-plane CLI")]
pub struct PioCli {
    /// Base URL of the local worker's `/unit_api` HTTP surface.
    #[arg(long, env = "RC_WORKER_URL", default_value = "http://localhost:4999")]
    pub worker_url: String,

    #[command(subcommand)]
    pub command: PioCommand,
}

#[derive(Debug, Subcommand)]
pub enum PioCommand {
    /// Run a job directly on this unit.
    Run {
        job: String,
        #[arg(long)]
        experiment: Option<String>,
        #[arg(long)]
        json: bool,
        #[arg(short = 'y', long)]
        yes: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        extra: Vec<String>,
    },
    /// Stop matching job(s) on this unit.
    Kill {
        #[arg(long = "job-name", visible_alias = "job")]
        job_name: Option<String>,
        #[arg(long)]
        experiment: Option<String>,
        #[arg(long = "all-jobs")]
        all_jobs: bool,
    },
    /// Trigger a software update task on this unit.
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
    },
    /// Install or uninstall a plugin on this unit.
    Plugins {
        #[command(subcommand)]
        action: PluginAction,
    },
    /// Copy a file into this unit's data directory.
    Cp { path: String },
    /// Remove a file from this unit's data directory.
    Rm { path: String },
    /// Reboot this unit.
    Reboot {
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Shut down this unit.
    Shutdown {
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
    },
    Uninstall {
        name: String,
    },
}

pub async fn dispatch(cli: PioCli) -> anyhow::Result<i32> {
    let client = HttpClient::new(cli.worker_url);
    match cli.command {
        PioCommand::Run { job, experiment, json, yes, extra } => run_job(&client, &job, experiment, &extra, json, yes).await,
        PioCommand::Kill { job_name, experiment, all_jobs } => kill(&client, job_name, experiment, all_jobs).await,
        PioCommand::Update { target, branch, version, source, repo } => update(&client, target, branch, version, source, repo).await,
        PioCommand::Plugins { action } => plugins(&client, action).await,
        PioCommand::Cp { path } => cp(&client, &path).await,
        PioCommand::Rm { path } => rm(&client, &path).await,
        PioCommand::Reboot { yes } => power(&client, yes, "reboot").await,
        PioCommand::Shutdown { yes } => power(&client, yes, "shutdown").await,
    }
}

async fn poll_and_print(client: &HttpClient, envelope: Value, format: OutputFormat) -> anyhow::Result<bool> {
    let envelope: rc_wire::TaskEnvelope = serde_json::from_value(envelope)?;
    let resolved = client.poll_task(envelope, POLL_BUDGET).await?;
    Ok(print_task_result(&resolved, format))
}

async fn run_job(client: &HttpClient, job: &str, experiment: Option<String>, extra: &[String], json_out: bool, yes: bool) -> anyhow::Result<i32> {
    let format = if json_out { OutputFormat::Json } else { OutputFormat::Text };
    let tail = rejoin_trailing(extra);
    let invocation = rc_shell::parse_invocation(&rc_shell::tokenize(&tail)?)?;
    let mut payload =
        RunJobPayload { args: invocation.args, options: invocation.options, env: invocation.env, config_overrides: invocation.config_overrides };
    if let Some(experiment) = experiment {
        payload.env.insert("EXPERIMENT".to_string(), experiment);
    }

    if !confirm(&format!("Run {job} here?"), yes || json_out) {
        return Err(ExitError::aborted().into());
    }

    let envelope = client.send_json(reqwest::Method::POST, &format!("/unit_api/jobs/run/job_name/{job}"), &payload).await?;
    let ok = poll_and_print(client, envelope, format).await?;
    Ok(if ok { 0 } else { 1 })
}

async fn kill(client: &HttpClient, job_name: Option<String>, experiment: Option<String>, all_jobs: bool) -> anyhow::Result<i32> {
    let response = if all_jobs {
        client.post("/unit_api/jobs/stop/all").await?
    } else {
        let body = json!({ "job_name": job_name, "experiment": experiment });
        client.send_json(reqwest::Method::POST, "/unit_api/jobs/stop", &body).await?
    };
    print_json(&response);
    Ok(0)
}

async fn update(
    client: &HttpClient,
    target: UpdateTarget,
    branch: Option<String>,
    version: Option<String>,
    source: Option<String>,
    repo: Option<String>,
) -> anyhow::Result<i32> {
    let target_str = match target {
        UpdateTarget::App => "app",
        UpdateTarget::Ui => "ui",
    };
    let body = json!({ "branch": branch, "version": version, "source": source, "repo": repo });
    let envelope = client.send_json(reqwest::Method::POST, &format!("/unit_api/system/update/{target_str}"), &body).await?;
    let ok = poll_and_print(client, envelope, OutputFormat::Text).await?;
    Ok(if ok { 0 } else { 1 })
}

async fn plugins(client: &HttpClient, action: PluginAction) -> anyhow::Result<i32> {
    let (body, path_suffix) = match action {
        PluginAction::Install { name, source } => (json!({ "name": name, "source": source }), "install"),
        PluginAction::Uninstall { name } => (json!({ "name": name }), "uninstall"),
    };
    let envelope = client.send_json(reqwest::Method::POST, &format!("/unit_api/plugins/{path_suffix}"), &body).await?;
    let ok = poll_and_print(client, envelope, OutputFormat::Text).await?;
    Ok(if ok { 0 } else { 1 })
}

async fn cp(client: &HttpClient, path: &str) -> anyhow::Result<i32> {
    let content = tokio::fs::read_to_string(path).await?;
    let name = std::path::Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or("upload.bin");
    let target_path = format!("uploads/{name}");
    let response = client.send_json(reqwest::Method::POST, "/unit_api/system/upload", &json!({ "path": target_path, "content": content })).await?;
    print_json(&response);
    Ok(0)
}

async fn rm(client: &HttpClient, path: &str) -> anyhow::Result<i32> {
    let response = client.send_json(reqwest::Method::POST, "/unit_api/system/remove_file", &json!({ "path": path })).await?;
    print_json(&response);
    Ok(0)
}

async fn power(client: &HttpClient, yes: bool, action: &str) -> anyhow::Result<i32> {
    if !confirm(&format!("{action} this unit?"), yes) {
        return Err(ExitError::aborted().into());
    }
    let envelope = client.post(&format!("/unit_api/system/{action}")).await?;
    let ok = poll_and_print(client, envelope, OutputFormat::Text).await?;
    Ok(if ok { 0 } else { 1 })
}
