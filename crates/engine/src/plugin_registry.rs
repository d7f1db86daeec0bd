// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup-time plugin manifest loading (SPEC_FULL §4.9). Each
//! subdirectory of the configured plugins directory may carry a
//! `plugin.toml` describing routes it wants registered and contrib
//! metadata it wants listed; `rc-leaderd`/`rc-workerd` read this once at
//! startup and build explicit `axum::Router::route(...)` calls from it.
//! There is no dynamic code loading — Rust has no import-side-effect
//! equivalent of the source's plugin discovery, so registration is
//! explicit (REDESIGN FLAGS).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Blocks `POST /plugins/install` and `/uninstall` when present in the
/// plugins directory (spec §4.6).
pub const DISALLOW_UI_INSTALLS: &str = "DISALLOW_UI_INSTALLS";
/// Blocks `GET /system/path` browsing/removal when present in the data
/// directory (spec §4.6).
pub const DISALLOW_UI_FILE_SYSTEM: &str = "DISALLOW_UI_FILE_SYSTEM";

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to read plugins directory {0:?}: {1}")]
    ReadDir(PathBuf, std::io::Error),
    #[error("failed to read {0:?}: {1}")]
    ReadManifest(PathBuf, std::io::Error),
    #[error("invalid plugin.toml at {0:?}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMethod {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub method: RouteMethod,
    pub path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContribSpec {
    #[serde(default)]
    pub automations: Vec<String>,
    #[serde(default)]
    pub jobs: Vec<String>,
    #[serde(default)]
    pub charts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub contrib: ContribSpec,
}

#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginManifest>,
}

impl PluginRegistry {
    /// Loads every `<plugins_dir>/*/plugin.toml`. A plugin directory
    /// without a manifest is silently skipped — not every installed
    /// plugin need expose routes or contrib metadata.
    pub fn load(plugins_dir: &Path) -> Result<Self, PluginError> {
        if !plugins_dir.exists() {
            return Ok(Self::default());
        }
        let mut plugins = Vec::new();
        let entries = std::fs::read_dir(plugins_dir).map_err(|e| PluginError::ReadDir(plugins_dir.to_path_buf(), e))?;
        for entry in entries {
            let entry = entry.map_err(|e| PluginError::ReadDir(plugins_dir.to_path_buf(), e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let manifest_path = entry.path().join("plugin.toml");
            if !manifest_path.exists() {
                continue;
            }
            let raw = std::fs::read_to_string(&manifest_path).map_err(|e| PluginError::ReadManifest(manifest_path.clone(), e))?;
            let manifest: PluginManifest =
                toml::from_str(&raw).map_err(|e| PluginError::Parse(manifest_path.clone(), e))?;
            plugins.push(manifest);
        }
        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { plugins })
    }

    pub fn manifests(&self) -> &[PluginManifest] {
        &self.plugins
    }

    pub fn contrib_automations(&self, automation_type: &str) -> Vec<String> {
        self.plugins.iter().flat_map(|p| p.contrib.automations.iter().cloned()).filter(|a| a == automation_type).collect()
    }

    pub fn contrib_jobs(&self) -> Vec<String> {
        self.plugins.iter().flat_map(|p| p.contrib.jobs.iter().cloned()).collect()
    }

    pub fn contrib_charts(&self) -> Vec<String> {
        self.plugins.iter().flat_map(|p| p.contrib.charts.iter().cloned()).collect()
    }
}

/// `true` when `<dir>/<sentinel>` exists, gating a UI-driven mutation.
pub fn sentinel_present(dir: &Path, sentinel: &str) -> bool {
    dir.join(sentinel).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_plugins_dir_yields_an_empty_registry() {
        let registry = PluginRegistry::load(Path::new("/nonexistent/plugins")).unwrap();
        assert!(registry.manifests().is_empty());
    }

    #[test]
    fn loads_a_manifest_and_aggregates_contrib_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("my_plugin");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(
            plugin_dir.join("plugin.toml"),
            r#"
            name = "my_plugin"
            version = "1.0.0"
            [[routes]]
            method = "get"
            path = "/contrib/my_plugin/status"
            [contrib]
            jobs = ["my_job"]
            "#,
        )
        .unwrap();

        let registry = PluginRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.manifests().len(), 1);
        assert_eq!(registry.contrib_jobs(), vec!["my_job".to_string()]);
    }

    #[test]
    fn a_plugin_directory_with_no_manifest_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("bare_plugin")).unwrap();
        let registry = PluginRegistry::load(dir.path()).unwrap();
        assert!(registry.manifests().is_empty());
    }

    #[test]
    fn sentinel_present_detects_the_marker_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!sentinel_present(dir.path(), DISALLOW_UI_INSTALLS));
        fs::write(dir.path().join(DISALLOW_UI_INSTALLS), "").unwrap();
        assert!(sentinel_present(dir.path(), DISALLOW_UI_INSTALLS));
    }
}
