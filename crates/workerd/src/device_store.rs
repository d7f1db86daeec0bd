// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calibrations and estimators are structurally identical on disk: a
//! YAML document per `(device, name)` under `<kind>/<device>/<name>.yaml`
//! plus one active selection per device in a `LocalKv` (spec §4.6 "Listing
//! endpoints must also return a packed archive endpoint"). This module
//! holds the shared file/YAML plumbing; `routes::calibrations` and
//! `routes::estimators` are thin wrappers naming their own directory and
//! `LocalKv`.

use crate::error::WorkerError;
use rc_wire::is_portable_filename;
use std::path::{Path, PathBuf};
use tokio::fs;

fn device_dir(base: &Path, device: &str) -> PathBuf {
    base.join(device)
}

fn doc_path(base: &Path, device: &str, name: &str) -> PathBuf {
    device_dir(base, device).join(format!("{name}.yaml"))
}

pub async fn list_devices(base: &Path) -> Result<Vec<String>, WorkerError> {
    let mut names = Vec::new();
    let Ok(mut entries) = fs::read_dir(base).await else { return Ok(names) };
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

pub async fn list_names(base: &Path, device: &str) -> Result<Vec<String>, WorkerError> {
    let dir = device_dir(base, device);
    let mut names = Vec::new();
    let Ok(mut entries) = fs::read_dir(&dir).await else { return Ok(names) };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

pub async fn read(base: &Path, device: &str, name: &str) -> Result<serde_yaml::Value, WorkerError> {
    let path = doc_path(base, device, name);
    let raw = fs::read_to_string(&path).await.map_err(|_| WorkerError::NotFound(format!("{device}/{name}")))?;
    serde_yaml::from_str(&raw).map_err(|e| WorkerError::Internal(format!("corrupt calibration document: {e}")))
}

pub async fn write(base: &Path, device: &str, name: &str, raw: &str) -> Result<(), WorkerError> {
    if !is_portable_filename(&format!("{name}.yaml")) {
        return Err(WorkerError::Validation(format!("{name:?} is not a valid calibration/estimator name")));
    }
    serde_yaml::from_str::<serde_yaml::Value>(raw).map_err(|e| WorkerError::Validation(format!("invalid YAML document: {e}")))?;

    let dir = device_dir(base, device);
    fs::create_dir_all(&dir).await?;
    fs::write(doc_path(base, device, name), raw).await?;
    Ok(())
}

pub async fn delete(base: &Path, device: &str, name: &str) -> Result<bool, WorkerError> {
    match fs::remove_file(doc_path(base, device, name)).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "od", "od-cal-v2", "name: od-cal-v2\ncurve: [1.0, 2.0]\n").await.unwrap();
        let doc = read(dir.path(), "od", "od-cal-v2").await.unwrap();
        assert_eq!(doc["name"], serde_yaml::Value::from("od-cal-v2"));
    }

    #[tokio::test]
    async fn write_rejects_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(dir.path(), "od", "bad", "not: [valid").await.unwrap_err();
        assert!(matches!(err, WorkerError::Validation(_)));
    }

    #[tokio::test]
    async fn write_rejects_a_non_portable_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = write(dir.path(), "od", "../escape", "name: x\n").await.unwrap_err();
        assert!(matches!(err, WorkerError::Validation(_)));
    }

    #[tokio::test]
    async fn list_names_reflects_written_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "od", "v1", "name: v1\n").await.unwrap();
        write(dir.path(), "od", "v2", "name: v2\n").await.unwrap();
        assert_eq!(list_names(dir.path(), "od").await.unwrap(), vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "od", "v1", "name: v1\n").await.unwrap();
        assert!(delete(dir.path(), "od", "v1").await.unwrap());
        assert!(!delete(dir.path(), "od", "v1").await.unwrap());
    }

    #[tokio::test]
    async fn list_devices_lists_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "od", "v1", "name: v1\n").await.unwrap();
        write(dir.path(), "temperature", "v1", "name: v1\n").await.unwrap();
        assert_eq!(list_devices(dir.path()).await.unwrap(), vec!["od", "temperature"]);
    }

    #[tokio::test]
    async fn listing_an_absent_directory_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_names(&dir.path().join("nope"), "od").await.unwrap().is_empty());
    }
}
