// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The user's run list, kept in sync with the run repository.
//!
//! Local state is the source of truth. Every mutation is applied locally
//! first and then sent to the repository on a best-effort basis: a failed
//! remote call is logged and surfaced as a transient error, and the local
//! change is kept. Remote calls for the same run id are serialized.

use crate::models::{RunRecord, UNSAVED_RUN_ID};
use crate::store::RunRepository;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

const LOAD_ERROR: &str = "Could not load runs";
const SAVE_ERROR: &str = "Could not save run";
const DELETE_ERROR: &str = "Could not delete run";

/// Immutable view of the run list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunListSnapshot {
    /// Runs, newest first
    pub runs: Vec<RunRecord>,
    /// A `load` is in flight
    pub is_loading: bool,
    /// Last remote failure, until dismissed or the next `load`
    pub error: Option<String>,
}

/// Run list with optimistic updates.
pub struct RunListController<R> {
    repo: R,
    state: watch::Sender<RunListSnapshot>,
    /// Per-run mutex to serialize remote calls for one id.
    sync_locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl<R: RunRepository> RunListController<R> {
    pub fn new(repo: R) -> Self {
        let (state, _) = watch::channel(RunListSnapshot::default());
        Self {
            repo,
            state,
            sync_locks: DashMap::new(),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<RunListSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RunListSnapshot {
        self.state.borrow().clone()
    }

    /// Runs, newest first.
    pub fn runs(&self) -> Vec<RunRecord> {
        self.state.borrow().runs.clone()
    }

    /// Look up a run for the detail view.
    pub fn find(&self, id: u64) -> Option<RunRecord> {
        self.state
            .borrow()
            .runs
            .iter()
            .find(|run| run.id() == id)
            .cloned()
    }

    /// Replace the list with `user`'s runs from the repository.
    ///
    /// The repository returns oldest first; the list shows newest first.
    pub async fn load(&self, user: &str) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        match self.repo.list(user).await {
            Ok(mut runs) => {
                runs.reverse();
                tracing::info!(user, count = runs.len(), "Runs loaded");
                self.state.send_modify(|state| {
                    state.runs = runs;
                    state.is_loading = false;
                });
            }
            Err(e) => {
                tracing::warn!(user, error = %e, "Failed to load runs");
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(LOAD_ERROR.to_string());
                });
            }
        }
    }

    /// Save a finished run.
    ///
    /// A run with id `0` is new: it is prepended and created remotely, and the
    /// assigned id is written back into the local copy. Any other id replaces
    /// the local run with that id and is updated remotely.
    pub async fn save(&self, run: RunRecord) {
        if run.is_persisted() {
            self.update(run).await;
        } else {
            self.create(run).await;
        }
    }

    async fn create(&self, run: RunRecord) {
        self.state
            .send_modify(|state| state.runs.insert(0, run.clone()));

        let lock = self.sync_lock(UNSAVED_RUN_ID);
        let _guard = lock.lock().await;

        match self.repo.create(&run).await {
            Ok(created) => {
                let id = created.id();
                self.state.send_modify(|state| {
                    if let Some(local) = state.runs.iter_mut().find(|local| **local == run) {
                        *local = run.with_id(id);
                    }
                });
                tracing::info!(id, "New run stored");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store new run");
                self.report(SAVE_ERROR);
            }
        }
    }

    async fn update(&self, run: RunRecord) {
        let id = run.id();
        self.state.send_modify(|state| {
            for local in state.runs.iter_mut().filter(|local| local.id() == id) {
                *local = run.clone();
            }
        });

        let lock = self.sync_lock(id);
        let _guard = lock.lock().await;

        match self.repo.update(id, &run).await {
            Ok(_) => tracing::info!(id, "Run update stored"),
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to store run update");
                self.report(SAVE_ERROR);
            }
        }
    }

    /// Remove a run locally, then from the repository.
    pub async fn delete(&self, id: u64) {
        self.state
            .send_modify(|state| state.runs.retain(|run| run.id() != id));

        let lock = self.sync_lock(id);
        let result = {
            let _guard = lock.lock().await;
            self.repo.delete(id).await
        };
        drop(lock);
        self.release_sync_lock(id);

        match result {
            Ok(()) => tracing::info!(id, "Run deleted"),
            Err(e) => {
                tracing::warn!(id, error = %e, "Failed to delete run");
                self.report(DELETE_ERROR);
            }
        }
    }

    /// Clear the transient error.
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Forget everything (logout).
    pub fn clear(&self) {
        self.state.send_replace(RunListSnapshot::default());
    }

    fn report(&self, message: &str) {
        self.state
            .send_modify(|state| state.error = Some(message.to_string()));
    }

    fn sync_lock(&self, id: u64) -> Arc<Mutex<()>> {
        self.sync_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock of a deleted run unless another call still holds it.
    fn release_sync_lock(&self, id: u64) {
        self.sync_locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRunRepository;
    use chrono::NaiveDate;
    use futures_util::future::join;
    use std::time::Duration;

    fn run(id: u64, seconds: u64) -> RunRecord {
        RunRecord::new(
            id,
            "ana",
            seconds,
            100.0,
            1.0,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        )
    }

    async fn controller() -> RunListController<MemoryRunRepository> {
        let repo =
            MemoryRunRepository::with_runs(vec![run(1, 60), run(2, 120), run(3, 180)]).await;
        let controller = RunListController::new(repo);
        controller.load("ana").await;
        controller
    }

    #[tokio::test]
    async fn test_delete_drops_sync_lock() {
        let controller = controller().await;

        controller.save(run(1, 90)).await;
        assert!(controller.sync_locks.contains_key(&1));

        controller.delete(1).await;
        assert!(!controller.sync_locks.contains_key(&1));

        // Failed deletes release it as well; the run is gone locally either way.
        controller.delete(42).await;
        assert!(!controller.sync_locks.contains_key(&42));
    }

    #[tokio::test]
    async fn test_delete_keeps_lock_still_held_elsewhere() {
        let controller = controller().await;

        let held = controller.sync_lock(3);
        controller.delete(3).await;
        assert!(controller.sync_locks.contains_key(&3));

        drop(held);
        controller.delete(3).await;
        assert!(!controller.sync_locks.contains_key(&3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_keeps_lock_with_queued_call() {
        let controller = controller().await;
        controller
            .repository()
            .set_latency(Some(Duration::from_millis(50)))
            .await;

        // The update waits on the delete's lock, so the entry must survive it.
        join(controller.delete(2), controller.save(run(2, 150))).await;
        assert!(controller.sync_locks.contains_key(&2));
        assert_eq!(
            controller.snapshot().error.as_deref(),
            Some(SAVE_ERROR),
            "update after delete reaches the store second"
        );
    }
}
