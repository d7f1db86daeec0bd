// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the `/api` axum router (spec §4.7).

pub mod configs;
pub mod experiments;
pub mod jobs;
pub mod logs;
pub mod profiles;
pub mod system;
pub mod timeseries;
pub mod workers;

use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/experiments", get(experiments::list))
        .route("/experiments", post(experiments::create))
        .route("/experiments/organisms", get(experiments::historical_organisms))
        .route("/experiments/media", get(experiments::historical_media))
        .route("/experiments/:experiment", get(experiments::get))
        .route("/experiments/:experiment", patch(experiments::update))
        .route("/experiments/:experiment", delete(experiments::delete))
        .route("/experiments/:experiment/assignment_count", get(experiments::assignment_count))
        .route("/experiments/:experiment/workers", get(experiments::assigned_workers))
        .route("/experiments/:experiment/logs", get(logs::for_experiment))
        .route("/experiments/:experiment/time_series/:metric_name", get(timeseries::get))
        .route("/workers", get(workers::list))
        .route("/workers", post(workers::add))
        .route("/workers/:unit", get(workers::get))
        .route("/workers/:unit", delete(workers::remove))
        .route("/workers/:unit/active", patch(workers::set_active))
        .route("/workers/:unit/model", patch(workers::set_model))
        .route("/workers/:unit/assignment", get(workers::assignment))
        .route("/workers/:unit/assignment", post(workers::assign))
        .route("/workers/:unit/assignment", delete(workers::unassign))
        .route("/workers/:unit/assignment_history", get(workers::assignment_history))
        .route("/workers/:unit/logs", get(logs::for_unit))
        .route("/workers/:unit/jobs/:experiment/:job", post(jobs::run))
        .route("/workers/:unit/jobs/:experiment/:job", patch(jobs::update))
        .route("/workers/:unit/jobs/:experiment/:job", delete(jobs::stop))
        .route("/workers/:unit/jobs/stop_all", post(jobs::stop_all))
        .route("/task_results/:task_id", get(jobs::task_result))
        .route("/configs/:filename", get(configs::get))
        .route("/configs/:filename", patch(configs::push))
        .route("/workers/:unit/system/reboot", post(system::reboot))
        .route("/workers/:unit/system/shutdown", post(system::shutdown))
        .route("/workers/:unit/system/update/:target", post(system::update))
        .route("/workers/:unit/plugins/install", post(system::plugin_install))
        .route("/workers/:unit/plugins/uninstall", post(system::plugin_uninstall))
        .route("/system/upload", post(system::upload))
        .route("/system/remove_file", post(system::remove_file))
        .route("/is_local_access_point_active", get(system::is_local_access_point_active))
        .route("/contrib/experiment_profiles", get(profiles::list))
        .route("/contrib/experiment_profiles/:filename", get(profiles::get))
        .route("/contrib/experiment_profiles/:filename", post(profiles::create))
        .route("/contrib/experiment_profiles/:filename", patch(profiles::update))
        .route("/contrib/experiment_profiles/:filename", delete(profiles::delete));

    Router::new().nest("/api", api).with_state(state)
}
