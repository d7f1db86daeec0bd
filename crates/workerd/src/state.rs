// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::AppConfig;
use crate::job_registry::JobRegistry;
use crate::rate_limit::Debouncer;
use crate::settings::PublishedSettings;
use rc_bus::{Bus, FakeBus, WsBus};
use rc_storage::LocalKv;
use std::sync::Arc;

/// Shared state every `workerd` axum handler sees, the same shape
/// `rc-leaderd::state::AppState` uses on the leader side.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bus: Arc<dyn Bus>,
    pub tasks: rc_engine::TaskQueue,
    pub jobs: JobRegistry,
    pub settings: PublishedSettings,
    pub debouncer: Arc<Debouncer>,
    pub active_calibrations: LocalKv,
    pub active_estimators: LocalKv,
    pub plugins: Arc<rc_engine::PluginRegistry>,
}

impl AppState {
    pub async fn bootstrap(config: AppConfig) -> Result<Self, anyhow::Error> {
        let bus: Arc<dyn Bus> = match &config.bus_url {
            Some(url) => WsBus::connect(url).await?,
            None => {
                tracing::warn!("RC_BUS_URL not set, running with an in-memory FakeBus");
                FakeBus::new()
            }
        };

        let tasks = rc_engine::TaskQueue::new();
        tasks.run_eviction_loop();

        let settings = PublishedSettings::new();
        settings.run_subscriber(bus.clone(), config.unit.clone());

        let plugins = Arc::new(rc_engine::PluginRegistry::load(&config.plugins_dir).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "plugin registry failed to load, continuing with no plugins");
            rc_engine::PluginRegistry::default()
        }));

        let active_calibrations = LocalKv::new(config.data_path("active_calibrations.json"));
        let active_estimators = LocalKv::new(config.data_path("active_estimators.json"));

        Ok(Self {
            config: Arc::new(config),
            bus,
            tasks,
            jobs: JobRegistry::new(),
            settings,
            debouncer: Arc::new(Debouncer::new()),
            active_calibrations,
            active_estimators,
            plugins,
        })
    }
}
