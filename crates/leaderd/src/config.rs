// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Leader process configuration (spec §6). Loaded from CLI flags with
/// environment-variable fallbacks, matching the teacher's convention of
/// a single flat config struct parsed once at startup.
#[derive(Debug, Clone, Parser)]
#[command(name = "rc-leaderd", about = "Cluster control-plane leader daemon")]
pub struct AppConfig {
    /// This unit's own hostname, used as the leader identity in Targeter.
    #[arg(long, env = "RC_LEADER_UNIT", default_value = "leader")]
    pub leader_unit: String,

    /// Address the `/api` HTTP surface binds to.
    #[arg(long, env = "RC_LEADER_BIND", default_value = "0.0.0.0:4999")]
    pub bind_addr: SocketAddr,

    /// Path to the central SQLite database.
    #[arg(long, env = "RC_LEADER_DB", default_value = ".pioreactor/storage/cluster.sqlite")]
    pub db_path: PathBuf,

    /// Base directory for uploads, archives, and sentinel files.
    #[arg(long, env = "RC_LEADER_DATA_DIR", default_value = ".pioreactor")]
    pub data_dir: PathBuf,

    /// Directory scanned for `*/plugin.toml` manifests at startup.
    #[arg(long, env = "RC_LEADER_PLUGINS_DIR", default_value = ".pioreactor/plugins")]
    pub plugins_dir: PathBuf,

    /// Bus broker WebSocket URL. When absent, an in-memory `FakeBus` is
    /// used instead (single-node demo / integration-test mode).
    #[arg(long, env = "RC_BUS_URL")]
    pub bus_url: Option<String>,

    /// Compiled-in answer for `GET /is_local_access_point_active` (spec
    /// §4.7 supplement) — the hardware check itself is out of scope.
    #[arg(long, env = "RC_IS_LOCAL_AP", default_value_t = false)]
    pub is_local_access_point: bool,
}

impl AppConfig {
    pub fn data_path(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }
}
