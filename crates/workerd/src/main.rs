// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rc-workerd`: the per-unit `/unit_api` HTTP surface (spec §4.6).

mod config;
mod device_store;
mod error;
mod job_registry;
mod rate_limit;
mod require_leader;
mod routes;
mod settings;
mod state;

use clap::Parser;
use config::AppConfig;
use state::AppState;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::parse();
    let bind_addr = config.bind_addr;
    tracing::info!(unit = %config.unit, %bind_addr, "starting rc-workerd");

    let state = AppState::bootstrap(config).await?;
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
