// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Worker process configuration (spec §6). Loaded from CLI flags with
/// environment-variable fallbacks, the same flat-struct-parsed-once
/// convention `rc-leaderd` uses.
#[derive(Debug, Clone, Parser)]
#[command(name = "rc-workerd", about = "Cluster control-plane worker daemon")]
pub struct AppConfig {
    /// This unit's own hostname.
    #[arg(long, env = "RC_WORKER_UNIT")]
    pub unit: String,

    /// Address the `/unit_api` HTTP surface binds to.
    #[arg(long, env = "RC_WORKER_BIND", default_value = "0.0.0.0:4999")]
    pub bind_addr: SocketAddr,

    /// Hostname or address of the cluster leader, used by `require_leader`.
    #[arg(long, env = "RC_LEADER_HOSTNAME", default_value = "leader")]
    pub leader_hostname: String,

    /// Base directory for calibrations, estimators, plugins, and state
    /// (the worker's `.pioreactor` equivalent).
    #[arg(long, env = "RC_WORKER_DATA_DIR", default_value = ".pioreactor")]
    pub data_dir: PathBuf,

    /// Directory scanned for `*/plugin.toml` manifests at startup.
    #[arg(long, env = "RC_WORKER_PLUGINS_DIR", default_value = ".pioreactor/plugins")]
    pub plugins_dir: PathBuf,

    /// Bus broker WebSocket URL. When absent, an in-memory `FakeBus` is
    /// used instead.
    #[arg(long, env = "RC_BUS_URL")]
    pub bus_url: Option<String>,

    /// This unit's active calibration/estimator model, if any.
    #[arg(long, env = "RC_WORKER_MODEL_NAME")]
    pub model_name: Option<String>,

    #[arg(long, env = "RC_WORKER_MODEL_VERSION")]
    pub model_version: Option<String>,
}

impl AppConfig {
    pub fn data_path(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }

    pub fn calibrations_dir(&self) -> PathBuf {
        self.data_path("calibrations")
    }

    pub fn estimators_dir(&self) -> PathBuf {
        self.data_path("estimators")
    }

    /// `true` when the caller's address matches the configured leader.
    /// Transport-level enforcement for `require_leader` (spec §4.6).
    pub fn is_leader_address(&self, peer_host: &str) -> bool {
        peer_host == self.leader_hostname || peer_host == "127.0.0.1" || peer_host == "::1"
    }
}
