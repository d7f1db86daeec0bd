// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin HTTP client shared by the `pios`→`leaderd` and `pio`→`workerd`
//! bridges (spec §4.10: "symmetric for worker-local CLI"). Just enough
//! GET/POST/PATCH/DELETE-with-JSON and task-result polling to drive
//! either service's HTTP surface from a terminal.

use rc_wire::{TaskEnvelope, TaskStatus};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport { url: String, #[source] source: reqwest::Error },
    #[error("{status} from {url}: {body}")]
    Http { url: String, status: u16, body: String },
    #[error("timed out waiting for task {0} to complete")]
    TaskTimeout(String),
}

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url(path);
        let response = self.http.get(&url).send().await.map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        Self::json_or_err(url, response).await
    }

    pub async fn send_json<T: Serialize + ?Sized>(&self, method: reqwest::Method, path: &str, body: &T) -> Result<Value, ClientError> {
        let url = self.url(path);
        let response = self
            .http
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        Self::json_or_err(url, response).await
    }

    pub async fn post(&self, path: &str) -> Result<Value, ClientError> {
        self.send_json(reqwest::Method::POST, path, &Value::Null).await
    }

    async fn json_or_err(url: String, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ClientError::Http { url, status: status.as_u16(), body: text });
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    /// Polls `result_url_path` until the task is `complete` or `failed`,
    /// or `max_wait` elapses (spec §4.5/§6 task-result envelope).
    pub async fn poll_task(&self, mut envelope: TaskEnvelope, max_wait: Duration) -> Result<TaskEnvelope, ClientError> {
        let deadline = tokio::time::Instant::now() + max_wait;
        while !matches!(envelope.status, TaskStatus::Complete | TaskStatus::Failed) {
            if tokio::time::Instant::now() >= deadline {
                return Err(ClientError::TaskTimeout(envelope.task_id.to_string()));
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
            let value = self.get(&envelope.result_url_path).await?;
            envelope = serde_json::from_value(value).unwrap_or(envelope);
        }
        Ok(envelope)
    }
}
