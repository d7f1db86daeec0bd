// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `active_calibrations[device] = name` / `active_estimators[device] =
//! name`: the worker's only local authoritative state besides the
//! calibration/estimator YAML files themselves and the running-job
//! registry (spec §3, §4.1).
//!
//! Persisted as a small JSON file under the worker's state directory,
//! written atomically (tmp file + rename) the same way the daemon's
//! snapshot writer avoids torn writes on crash.

use crate::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Default)]
pub struct LocalKv {
    path: PathBuf,
}

impl LocalKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(map)?;
        let tmp_path = tmp_path_for(&self.path);
        fs::write(&tmp_path, body).await?;
        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Read the active value for `device`, if any.
    pub async fn get(&self, device: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load().await?.get(device).cloned())
    }

    /// Set the active value for `device`. Idempotent.
    pub async fn set(&self, device: &str, name: &str) -> Result<(), StoreError> {
        let mut map = self.load().await?;
        map.insert(device.to_string(), name.to_string());
        self.save(&map).await
    }

    /// Clear the active value for `device`, if set. Idempotent.
    pub async fn clear(&self, device: &str) -> Result<(), StoreError> {
        let mut map = self.load().await?;
        map.remove(device);
        self.save(&map).await
    }

    pub async fn all(&self) -> Result<HashMap<String, String>, StoreError> {
        self.load().await
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKv::new(dir.path().join("active_calibrations.json"));
        kv.set("od", "od-cal-v2").await.unwrap();
        assert_eq!(kv.get("od").await.unwrap().as_deref(), Some("od-cal-v2"));
    }

    #[tokio::test]
    async fn set_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKv::new(dir.path().join("active.json"));
        kv.set("od", "v1").await.unwrap();
        kv.set("od", "v1").await.unwrap();
        assert_eq!(kv.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_the_device_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKv::new(dir.path().join("active.json"));
        kv.set("od", "v1").await.unwrap();
        kv.clear("od").await.unwrap();
        assert_eq!(kv.get("od").await.unwrap(), None);
        kv.clear("od").await.unwrap(); // idempotent
    }

    #[tokio::test]
    async fn get_on_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let kv = LocalKv::new(dir.path().join("nope.json"));
        assert_eq!(kv.get("od").await.unwrap(), None);
    }
}
