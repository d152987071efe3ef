// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runs REST API client.
//!
//! Handles:
//! - Listing a user's runs (`GET runs?usuario=`)
//! - Creating, replacing and deleting runs (`POST`, `PUT`, `DELETE runs/{id}`)
//! - Mapping HTTP failures onto `Network` / `NotFound`

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{RunPayload, RunRecord};
use crate::store::{RunRepository, RUNS_PATH};
use serde::Deserialize;
use std::time::Duration;

/// JSON-over-HTTP run repository.
#[derive(Clone)]
pub struct HttpRunRepository {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRunRepository {
    /// Create a client for the API at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    fn runs_url(&self) -> String {
        format!("{}/{}", self.base_url, RUNS_PATH)
    }

    fn run_url(&self, id: u64) -> String {
        format!("{}/{}/{}", self.base_url, RUNS_PATH, id)
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(resource.to_string()));
        }

        Err(AppError::Network(format!("HTTP {}: {}", status, body)))
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        self.check_response(response, resource)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Network(format!("JSON parse error: {}", e)))
    }
}

impl RunRepository for HttpRunRepository {
    async fn list(&self, user: &str) -> Result<Vec<RunRecord>> {
        let response = self
            .http
            .get(self.runs_url())
            .query(&[("usuario", user)])
            .send()
            .await?;

        // The mock API answers 404 when a filter matches nothing.
        let payloads: Vec<RunPayload> = match self
            .check_response_json(response, &format!("runs for {}", user))
            .await
        {
            Ok(payloads) => payloads,
            Err(AppError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        let total = payloads.len();
        // The server-side filter is a substring match, keep exact owners only.
        let runs: Vec<RunRecord> = payloads
            .into_iter()
            .filter(|payload| payload.user == user)
            .filter_map(|payload| {
                let id = payload.id;
                RunRecord::try_from(payload)
                    .map_err(|e| tracing::warn!(id, error = %e, "Skipping malformed run"))
                    .ok()
            })
            .collect();

        tracing::debug!(user, total, kept = runs.len(), "Listed runs");
        Ok(runs)
    }

    async fn create(&self, run: &RunRecord) -> Result<RunRecord> {
        let response = self
            .http
            .post(self.runs_url())
            .json(&RunPayload::from(run))
            .send()
            .await?;

        let payload: RunPayload = self.check_response_json(response, RUNS_PATH).await?;
        let created = decode_echo(payload, run);
        tracing::info!(id = created.id(), user = created.user(), "Run created");
        Ok(created)
    }

    async fn update(&self, id: u64, run: &RunRecord) -> Result<RunRecord> {
        let response = self
            .http
            .put(self.run_url(id))
            .json(&RunPayload::from(run))
            .send()
            .await?;

        let payload: RunPayload = self
            .check_response_json(response, &format!("run {}", id))
            .await?;
        let mut updated = decode_echo(payload, run);
        if !updated.is_persisted() {
            updated = updated.with_id(id);
        }
        tracing::info!(id, "Run updated");
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let response = self.http.delete(self.run_url(id)).send().await?;
        self.check_response(response, &format!("run {}", id)).await?;
        tracing::info!(id, "Run deleted");
        Ok(())
    }
}

/// Decode the server's echo of a written run, keeping our own values if the
/// echo carries an unreadable date.
fn decode_echo(payload: RunPayload, sent: &RunRecord) -> RunRecord {
    let id = payload.id;
    RunRecord::try_from(payload).unwrap_or_else(|e| {
        tracing::warn!(id, error = %e, "Server echoed a malformed run");
        sent.with_id(id)
    })
}
