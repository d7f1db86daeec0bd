// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles the `/unit_api` axum router (spec §4.6). Every route except
//! `/unit_api/health` requires the caller to be the cluster leader;
//! `require_leader` is applied as a single layer rather than decorating
//! each handler, matching the source's transport-level enforcement but
//! expressed as axum middleware (REDESIGN FLAGS).

pub mod archive;
pub mod calibrations;
pub mod configs;
pub mod estimators;
pub mod jobs;
pub mod misc;
pub mod plugins;
pub mod system;

use crate::require_leader::require_leader;
use crate::state::AppState;
use axum::routing::{delete, get, patch, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/jobs/run/job_name/:job_name", post(jobs::run))
        .route("/jobs/stop", post(jobs::stop))
        .route("/jobs/stop/all", post(jobs::stop_all))
        .route("/jobs/running", get(jobs::running))
        .route("/jobs/running/:job_name", get(jobs::running_job))
        .route("/jobs/running/experiment/:experiment", get(jobs::running_for_experiment))
        .route("/jobs/running/long_running", get(jobs::long_running))
        .route("/jobs/settings/job_name/:job_name", get(jobs::settings_for_job))
        .route("/jobs/settings/job_name/:job_name", patch(jobs::update_setting))
        .route("/jobs/settings/job_name/:job_name/setting/:setting", get(jobs::setting))
        .route("/task_results/:task_id", get(jobs::task_result))
        .route("/calibrations", get(calibrations::list_devices))
        .route("/calibrations/:device", get(calibrations::list_for_device))
        .route("/calibrations/:device", post(calibrations::create))
        .route("/calibrations/:device/:name", get(calibrations::get))
        .route("/calibrations/:device/:name", delete(calibrations::delete))
        .route("/active_calibrations/:device", post(calibrations::set_active))
        .route("/active_calibrations/:device", delete(calibrations::clear_active))
        .route("/estimators", get(estimators::list_devices))
        .route("/estimators/:device", get(estimators::list_for_device))
        .route("/estimators/:device", post(estimators::create))
        .route("/estimators/:device/:name", get(estimators::get))
        .route("/estimators/:device/:name", delete(estimators::delete))
        .route("/active_estimators/:device", post(estimators::set_active))
        .route("/active_estimators/:device", delete(estimators::clear_active))
        .route("/zipped_dot_pioreactor", get(archive::zipped_dot_pioreactor))
        .route("/import_zipped_dot_pioreactor", post(archive::import_zipped_dot_pioreactor))
        .route("/zipped_calibrations", get(archive::zipped_calibrations))
        .route("/configs/:filename", post(configs::push))
        .route("/system/reboot", post(system::reboot))
        .route("/system/shutdown", post(system::shutdown))
        .route("/system/update", post(system::update))
        .route("/system/update/:target", post(system::update_to))
        .route("/system/utc_clock", post(system::set_utc_clock))
        .route("/system/web_server/status", get(system::web_server_status))
        .route("/system/web_server/restart", post(system::web_server_restart))
        .route("/system/path", get(system::browse_root))
        .route("/system/path/*req_path", get(system::browse))
        .route("/system/remove_file", post(system::remove_file))
        .route("/system/upload", post(system::upload))
        .route("/plugins/installed", get(plugins::installed))
        .route("/plugins/install", post(plugins::install))
        .route("/plugins/uninstall", post(plugins::uninstall))
        .route("/versions/app", get(misc::app_version))
        .route("/capabilities", get(misc::capabilities))
        .route("/calibration_protocols", get(misc::calibration_protocols))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_leader));

    let unit_api = Router::new().route("/health", get(misc::health)).merge(guarded);

    Router::new().nest("/unit_api", unit_api).with_state(state)
}
