// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rc-leaderd`: the cluster-wide `/api` HTTP surface (spec §4.7).

mod config;
mod error;
mod routes;
mod state;

use clap::Parser;
use config::AppConfig;
use rc_adapters::{MdnsResolver, UnitResolver};
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::parse();
    let bind_addr = config.bind_addr;
    tracing::info!(leader_unit = %config.leader_unit, %bind_addr, "starting rc-leaderd");

    let resolver: Arc<dyn UnitResolver> = Arc::new(MdnsResolver::default());
    let state = AppState::bootstrap(config, resolver).await?;
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
