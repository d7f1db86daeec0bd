// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::AppConfig;
use rc_adapters::{Multicaster, UnitClient, UnitResolver};
use rc_bus::{Bus, FakeBus, WsBus};
use rc_engine::{Orchestrator, PluginRegistry, TaskQueue};
use rc_storage::Store;
use std::sync::Arc;

/// Shared state every axum handler sees (spec §4.8). Cheap to clone —
/// every field is already an `Arc`/pool handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub bus: Arc<dyn Bus>,
    pub orchestrator: Orchestrator,
    pub plugins: Arc<PluginRegistry>,
}

impl AppState {
    pub async fn bootstrap(config: AppConfig, resolver: Arc<dyn UnitResolver>) -> Result<Self, anyhow::Error> {
        let db_path = config.db_path.to_string_lossy().to_string();
        let store = Store::connect(&db_path).await?;

        let bus: Arc<dyn Bus> = match &config.bus_url {
            Some(url) => WsBus::connect(url).await?,
            None => {
                tracing::warn!("RC_BUS_URL not set, running with an in-memory FakeBus");
                FakeBus::new()
            }
        };

        let unit_client = Arc::new(UnitClient::new(resolver));
        let multicaster = Arc::new(Multicaster::new(unit_client));
        let tasks = TaskQueue::new();
        tasks.run_eviction_loop();

        let plugins = Arc::new(PluginRegistry::load(&config.plugins_dir).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "plugin registry failed to load, continuing with no plugins");
            PluginRegistry::default()
        }));

        let orchestrator =
            Orchestrator::new(store.clone(), bus.clone(), multicaster, tasks, rc_core::UnitId::new(config.leader_unit.clone()));

        Ok(Self { config: Arc::new(config), store, bus, orchestrator, plugins })
    }
}
