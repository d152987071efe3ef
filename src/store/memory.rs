// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process run repository.
//!
//! Mirrors the REST API semantics (server-assigned ids, `NotFound` on unknown
//! ids) and can be told to fail or to stall, which is how the list controller's
//! best-effort sync is exercised offline.

use crate::error::{AppError, Result};
use crate::models::RunRecord;
use crate::store::RunRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A repository operation, recorded when it starts and when it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryCall {
    List { user: String },
    Create,
    Update { id: u64 },
    Delete { id: u64 },
    Finished(Box<RepositoryCall>),
}

#[derive(Default)]
struct MemoryState {
    runs: Vec<RunRecord>,
    last_id: u64,
    fail_network: bool,
    latency: Option<Duration>,
    calls: Vec<RepositoryCall>,
}

/// In-memory [`RunRepository`].
#[derive(Clone, Default)]
pub struct MemoryRunRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRunRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `runs`, keeping their ids.
    pub async fn with_runs(runs: Vec<RunRecord>) -> Self {
        let repo = Self::new();
        {
            let mut state = repo.state.lock().await;
            state.last_id = runs.iter().map(RunRecord::id).max().unwrap_or(0);
            state.runs = runs;
        }
        repo
    }

    /// Make every following call fail with `AppError::Network` (or stop failing).
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.fail_network = offline;
    }

    /// Delay every following call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().await.latency = latency;
    }

    /// Snapshot of everything stored, in store order.
    pub async fn stored(&self) -> Vec<RunRecord> {
        self.state.lock().await.runs.clone()
    }

    /// Calls made so far, including `Finished` markers.
    pub async fn calls(&self) -> Vec<RepositoryCall> {
        self.state.lock().await.calls.clone()
    }

    /// Record the call and apply configured failure and latency.
    async fn begin(&self, call: RepositoryCall) -> Result<()> {
        let (fail, latency) = {
            let mut state = self.state.lock().await;
            state.calls.push(call);
            (state.fail_network, state.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if fail {
            return Err(AppError::Network("repository offline".to_string()));
        }
        Ok(())
    }

    async fn finish(&self, call: RepositoryCall) {
        self.state
            .lock()
            .await
            .calls
            .push(RepositoryCall::Finished(Box::new(call)));
    }
}

impl RunRepository for MemoryRunRepository {
    async fn list(&self, user: &str) -> Result<Vec<RunRecord>> {
        let call = RepositoryCall::List {
            user: user.to_string(),
        };
        self.begin(call.clone()).await?;
        let runs = self
            .state
            .lock()
            .await
            .runs
            .iter()
            .filter(|run| run.user() == user)
            .cloned()
            .collect();
        self.finish(call).await;
        Ok(runs)
    }

    async fn create(&self, run: &RunRecord) -> Result<RunRecord> {
        self.begin(RepositoryCall::Create).await?;
        let created = {
            let mut state = self.state.lock().await;
            state.last_id += 1;
            let created = run.with_id(state.last_id);
            state.runs.push(created.clone());
            created
        };
        self.finish(RepositoryCall::Create).await;
        Ok(created)
    }

    async fn update(&self, id: u64, run: &RunRecord) -> Result<RunRecord> {
        let call = RepositoryCall::Update { id };
        self.begin(call.clone()).await?;
        let updated = {
            let mut state = self.state.lock().await;
            let slot = state
                .runs
                .iter_mut()
                .find(|stored| stored.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("run {}", id)))?;
            *slot = run.with_id(id);
            slot.clone()
        };
        self.finish(call).await;
        Ok(updated)
    }

    async fn delete(&self, id: u64) -> Result<()> {
        let call = RepositoryCall::Delete { id };
        self.begin(call.clone()).await?;
        {
            let mut state = self.state.lock().await;
            let before = state.runs.len();
            state.runs.retain(|stored| stored.id() != id);
            if state.runs.len() == before {
                return Err(AppError::NotFound(format!("run {}", id)));
            }
        }
        self.finish(call).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run(user: &str, seconds: u64) -> RunRecord {
        RunRecord::new(
            0,
            user,
            seconds,
            0.0,
            0.0,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let repo = MemoryRunRepository::new();
        let first = repo.create(&run("ana", 10)).await.unwrap();
        let second = repo.create(&run("ana", 20)).await.unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(repo.list("ana").await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let repo = MemoryRunRepository::new();
        repo.create(&run("ana", 10)).await.unwrap();
        repo.create(&run("luis", 20)).await.unwrap();

        let runs = repo.list("luis").await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].user(), "luis");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let repo = MemoryRunRepository::new();
        assert!(repo.update(5, &run("ana", 1)).await.unwrap_err().is_not_found());
        assert!(repo.delete(5).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_offline_fails_with_network_error() {
        let repo = MemoryRunRepository::new();
        repo.set_offline(true).await;
        assert!(repo.list("ana").await.unwrap_err().is_network());

        repo.set_offline(false).await;
        assert!(repo.list("ana").await.is_ok());
    }
}
