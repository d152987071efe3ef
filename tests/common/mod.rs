// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use fit_tracker::models::RunRecord;
use fit_tracker::services::{FixedClock, RunListController, RunRecordingSession};
use fit_tracker::store::MemoryRunRepository;
use std::sync::Arc;

/// Date every test clock reports.
#[allow(dead_code)]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 4).expect("valid date")
}

/// Clock pinned to [`test_date`].
#[allow(dead_code)]
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(test_date()))
}

/// A session that has been started.
#[allow(dead_code)]
pub fn started_session() -> RunRecordingSession {
    let mut session = RunRecordingSession::new(test_clock());
    session.start();
    session
}

/// A run record for `user` with the given measurements.
#[allow(dead_code)]
pub fn make_run(id: u64, user: &str, elapsed_seconds: u64, distance_meters: f64) -> RunRecord {
    let speed = if elapsed_seconds > 0 {
        (distance_meters / 1000.0) / (elapsed_seconds as f64 / 3600.0)
    } else {
        0.0
    };
    RunRecord::new(id, user, elapsed_seconds, distance_meters, speed, test_date())
}

/// A run list backed by an in-memory repository (returned for inspection).
#[allow(dead_code)]
pub fn test_controller() -> (RunListController<MemoryRunRepository>, MemoryRunRepository) {
    let repo = MemoryRunRepository::new();
    (RunListController::new(repo.clone()), repo)
}
