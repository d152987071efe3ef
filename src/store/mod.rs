// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run storage layer.
//!
//! The runs live behind a remote REST API ([`HttpRunRepository`]).
//! [`MemoryRunRepository`] keeps them in-process for offline use and tests.

pub mod http;
pub mod memory;

pub use http::HttpRunRepository;
pub use memory::{MemoryRunRepository, RepositoryCall};

use crate::error::Result;
use crate::models::RunRecord;
use std::future::Future;

/// Resource path of the runs collection.
pub const RUNS_PATH: &str = "runs";

/// Remote CRUD store for runs.
///
/// `list` returns runs in the store's order (oldest first).
pub trait RunRepository: Send + Sync {
    /// All runs owned by `user`.
    fn list(&self, user: &str) -> impl Future<Output = Result<Vec<RunRecord>>> + Send;

    /// Store a new run; the returned record carries the assigned id.
    fn create(&self, run: &RunRecord) -> impl Future<Output = Result<RunRecord>> + Send;

    /// Replace the run stored under `id`.
    fn update(&self, id: u64, run: &RunRecord) -> impl Future<Output = Result<RunRecord>> + Send;

    /// Remove the run stored under `id`.
    fn delete(&self, id: u64) -> impl Future<Output = Result<()>> + Send;
}
