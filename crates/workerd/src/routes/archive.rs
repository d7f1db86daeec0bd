// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /unit_api/zipped_dot_pioreactor`, `POST
//! /unit_api/import_zipped_dot_pioreactor`, and `GET
//! /unit_api/zipped_calibrations` (spec §4.6 "archive endpoints pack a
//! directory tree into a zip, skipping database files"). Import runs
//! under `import-dot-pioreactor-lock` since it can take a while and
//! overlapping imports would race on the same files.

use crate::error::WorkerError;
use crate::state::AppState;
use async_zip::base::read::seek::ZipFileReader;
use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use rc_engine::{NamedLock, SpawnOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const RESULT_URL_PREFIX: &str = "/unit_api/task_results";

#[derive(Debug, Serialize, Deserialize)]
struct ArchiveMetadata {
    metadata_version: u32,
    name: String,
    leader_hostname: String,
    is_leader: bool,
    app_version: String,
    exported_at_utc: String,
}

fn is_excluded(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| ext.starts_with("sqlite"))
}

async fn build_archive(root: &Path, metadata: ArchiveMetadata) -> Result<Vec<u8>, WorkerError> {
    let mut buf = Vec::new();
    let mut writer = ZipFileWriter::with_tokio(&mut buf);

    let metadata_json = serde_json::to_vec_pretty(&metadata).map_err(|e| WorkerError::Internal(e.to_string()))?;
    let builder = ZipEntryBuilder::new("metadata.json".to_string().into(), Compression::Deflate);
    writer.write_entry_whole(builder, &metadata_json).await.map_err(|e| WorkerError::Internal(e.to_string()))?;

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else { continue };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                stack.push(path);
                continue;
            }
            if is_excluded(&path) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else { continue };
            let Some(name) = relative.to_str() else { continue };
            let content = tokio::fs::read(&path).await?;
            let builder = ZipEntryBuilder::new(name.to_string().into(), Compression::Deflate);
            writer.write_entry_whole(builder, &content).await.map_err(|e| WorkerError::Internal(e.to_string()))?;
        }
    }
    writer.close().await.map_err(|e| WorkerError::Internal(e.to_string()))?;
    Ok(buf)
}

pub async fn zipped_dot_pioreactor(State(state): State<AppState>) -> Result<impl IntoResponse, WorkerError> {
    let metadata = ArchiveMetadata {
        metadata_version: 1,
        name: state.config.unit.clone(),
        leader_hostname: state.config.leader_hostname.clone(),
        is_leader: false,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at_utc: chrono::Utc::now().to_rfc3339(),
    };
    let bytes = build_archive(&state.config.data_dir, metadata).await?;
    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/zip")],
        bytes,
    ))
}

pub async fn zipped_calibrations(State(state): State<AppState>) -> Result<impl IntoResponse, WorkerError> {
    let metadata = ArchiveMetadata {
        metadata_version: 1,
        name: state.config.unit.clone(),
        leader_hostname: state.config.leader_hostname.clone(),
        is_leader: false,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at_utc: chrono::Utc::now().to_rfc3339(),
    };
    let bytes = build_archive(&state.config.calibrations_dir(), metadata).await?;
    Ok((
        [(axum::http::header::CONTENT_TYPE, "application/zip")],
        bytes,
    ))
}

async fn extract_archive(dest: &Path, bytes: Bytes) -> Result<usize, WorkerError> {
    tokio::fs::create_dir_all(dest).await?;
    let cursor = Cursor::new(bytes.to_vec());
    let mut reader = ZipFileReader::with_tokio(cursor).await.map_err(|e| WorkerError::Validation(format!("not a valid archive: {e}")))?;

    let mut written = 0usize;
    for index in 0..reader.file().entries().len() {
        let entry = reader.file().entries().get(index).ok_or_else(|| WorkerError::Internal("zip index out of range".to_string()))?;
        let filename = entry.filename().as_str().map_err(|e| WorkerError::Validation(e.to_string()))?.to_string();
        if filename == "metadata.json" || filename.ends_with('/') {
            continue;
        }
        if filename.contains("..") {
            return Err(WorkerError::Validation(format!("{filename:?} escapes the archive root")));
        }

        let mut entry_reader = reader.reader_with_entry(index).await.map_err(|e| WorkerError::Internal(e.to_string()))?;
        let mut content = Vec::new();
        use tokio::io::AsyncReadExt;
        entry_reader.read_to_end_checked(&mut content).await.map_err(|e| WorkerError::Internal(e.to_string()))?;

        let target: PathBuf = dest.join(&filename);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(&target).await?;
        file.write_all(&content).await?;
        written += 1;
    }
    Ok(written)
}

pub async fn import_zipped_dot_pioreactor(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(axum::http::StatusCode, axum::Json<rc_wire::TaskEnvelope>), WorkerError> {
    let mut archive_bytes = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| WorkerError::Validation(e.to_string()))? {
        if field.name() == Some("archive") {
            archive_bytes = Some(field.bytes().await.map_err(|e| WorkerError::Validation(e.to_string()))?);
        }
    }
    let bytes = archive_bytes.ok_or_else(|| WorkerError::Validation("missing \"archive\" multipart field".to_string()))?;

    let data_dir = state.config.data_dir.clone();
    let outcome = state.tasks.spawn(Some(NamedLock::ImportDotPioreactor), async move {
        let written = extract_archive(&data_dir, bytes).await.map_err(|e| e.to_string())?;
        Ok(json!({ "files_written": written }))
    });

    let envelope = match outcome {
        SpawnOutcome::Started(task_id) => rc_wire::TaskEnvelope::in_progress(task_id, RESULT_URL_PREFIX),
        SpawnOutcome::Locked { task_id, lock } => rc_wire::TaskEnvelope::locked(task_id, RESULT_URL_PREFIX, lock),
    };
    let status = axum::http::StatusCode::from_u16(envelope.http_status()).unwrap_or(axum::http::StatusCode::ACCEPTED);
    Ok((status, axum::Json(envelope)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_sqlite_files() {
        assert!(is_excluded(Path::new("/data/storage.sqlite")));
        assert!(is_excluded(Path::new("/data/storage.sqlite-wal")));
        assert!(!is_excluded(Path::new("/data/config.ini")));
    }
}
