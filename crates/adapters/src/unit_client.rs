// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed HTTP client that resolves a unit name to an address and
//! issues a single request against the worker API (spec §4.3).

use crate::error::AdaptersError;
use crate::resolver::UnitResolver;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Default timeouts per spec §5: GET 5s, mutating verbs 30s, archive
/// operations 60-120s (callers pass an explicit override for those).
pub const DEFAULT_GET_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MUTATE_TIMEOUT: Duration = Duration::from_secs(30);
pub const ARCHIVE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A response body: parsed JSON for ordinary endpoints, or a raw byte
/// stream for archive downloads (`raw: true` at the `Multicaster`
/// layer, spec §4.4).
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Raw(Vec<u8>),
}

pub struct UnitClient {
    http: reqwest::Client,
    resolver: Arc<dyn UnitResolver>,
}

impl UnitClient {
    pub fn new(resolver: Arc<dyn UnitResolver>) -> Self {
        Self { http: reqwest::Client::new(), resolver }
    }

    /// Issue a single call against `unit`'s worker API. `path` must
    /// start with `/unit_api` (spec §4.3).
    pub async fn call(
        &self,
        unit: &str,
        method: Method,
        path: &str,
        json: Option<&Value>,
        params: &[(&str, &str)],
        timeout: Duration,
        raw: bool,
    ) -> Result<Body, AdaptersError> {
        if !path.starts_with("/unit_api") {
            return Err(AdaptersError::BadPath(path.to_string()));
        }
        let base = self.resolver.resolve(unit).ok_or_else(|| AdaptersError::UnresolvedUnit(unit.to_string()))?;
        let url = format!("{base}{path}");

        let mut builder = self.http.request(method.to_reqwest(), &url).timeout(timeout).query(params);
        if let Some(body) = json {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| {
            if source.is_timeout() {
                AdaptersError::Timeout { unit: unit.to_string(), timeout }
            } else {
                AdaptersError::Transport { unit: unit.to_string(), source }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(AdaptersError::Http { unit: unit.to_string(), status: status.as_u16(), body: body_text });
        }

        if raw {
            let bytes = response.bytes().await.map_err(|source| AdaptersError::Transport { unit: unit.to_string(), source })?;
            Ok(Body::Raw(bytes.to_vec()))
        } else {
            let value: Value = response.json().await.unwrap_or(Value::Null);
            Ok(Body::Json(value))
        }
    }

    pub async fn get(&self, unit: &str, path: &str, params: &[(&str, &str)]) -> Result<Body, AdaptersError> {
        self.call(unit, Method::Get, path, None, params, DEFAULT_GET_TIMEOUT, false).await
    }

    pub async fn post<T: Serialize>(&self, unit: &str, path: &str, json: &T) -> Result<Body, AdaptersError> {
        let value = serde_json::to_value(json).unwrap_or(Value::Null);
        self.call(unit, Method::Post, path, Some(&value), &[], DEFAULT_MUTATE_TIMEOUT, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TableResolver;

    #[tokio::test]
    async fn rejects_paths_outside_unit_api() {
        let client = UnitClient::new(Arc::new(TableResolver::new().with("u1", "http://127.0.0.1:1")));
        let err = client.get("u1", "/api/jobs/running", &[]).await.unwrap_err();
        assert!(matches!(err, AdaptersError::BadPath(_)));
    }

    #[tokio::test]
    async fn unresolved_unit_is_an_error() {
        let client = UnitClient::new(Arc::new(TableResolver::new()));
        let err = client.get("ghost", "/unit_api/jobs/running", &[]).await.unwrap_err();
        assert!(matches!(err, AdaptersError::UnresolvedUnit(_)));
    }
}
