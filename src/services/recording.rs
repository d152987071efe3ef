// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run recording state machine.
//!
//! Turns one-second clock ticks and accelerometer samples into elapsed time,
//! a step count and an estimated distance, then finalizes that state into a
//! [`RunRecord`].
//!
//! ```text
//! Created --start/resume_from--> Running{paused} <--toggle_pause--> Running{!paused}
//!                                       |
//!                                     stop
//!                                       v
//!                                    Stopped
//! ```
//!
//! No operation fails. Malformed resume input degrades to zero.

use crate::models::{RunPayload, RunRecord};
use crate::services::sources::ClockSource;
use crate::time_utils::{format_elapsed, parse_distance, parse_elapsed, parse_or_default};
use std::sync::Arc;

/// Distance credited per detected step, in meters.
pub const STEP_LENGTH_M: f64 = 0.75;

/// Minimum rise in acceleration magnitude between two samples that counts as
/// a step, in the sensor's native units.
pub const STEP_THRESHOLD: f64 = 2.0;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Constructed, not yet accepting ticks or samples.
    Created,
    /// Accepting ticks and samples (subject to `paused`).
    Running,
    /// Finalized. Terminal.
    Stopped,
}

/// Immutable view of a session's state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub elapsed_seconds: u64,
    pub distance_meters: f64,
    pub step_count: u64,
    pub paused: bool,
}

impl SessionSnapshot {
    /// Elapsed time as `HH:MM:SS`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// Accumulates time, steps and distance for one run.
pub struct RunRecordingSession {
    clock: Arc<dyn ClockSource>,
    phase: SessionPhase,
    elapsed_seconds: u64,
    distance_meters: f64,
    step_count: u64,
    paused: bool,
    last_sample_magnitude: f64,
}

impl RunRecordingSession {
    pub fn new(clock: Arc<dyn ClockSource>) -> Self {
        Self {
            clock,
            phase: SessionPhase::Created,
            elapsed_seconds: 0,
            distance_meters: 0.0,
            step_count: 0,
            paused: false,
            last_sample_magnitude: 0.0,
        }
    }

    /// Begin a fresh run: zero state, not paused.
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Stopped {
            tracing::debug!("Ignoring start on a stopped session");
            return;
        }
        self.elapsed_seconds = 0;
        self.distance_meters = 0.0;
        self.step_count = 0;
        self.last_sample_magnitude = 0.0;
        self.paused = false;
        self.phase = SessionPhase::Running;
    }

    /// Continue a previously stored run. The session starts paused.
    pub fn resume_from(&mut self, record: &RunRecord) {
        self.resume_from_payload(&RunPayload::from(record));
    }

    /// Continue a run from its wire form.
    ///
    /// Elapsed time is read as `H:MM:SS` and distance as `"<x.xx> metros"`
    /// (decimal comma accepted). Either one falls back to zero when it does not
    /// parse. The step count is derived from the distance.
    pub fn resume_from_payload(&mut self, payload: &RunPayload) {
        if self.phase == SessionPhase::Stopped {
            tracing::debug!("Ignoring resume on a stopped session");
            return;
        }
        self.elapsed_seconds = parse_or_default(parse_elapsed(&payload.elapsed));
        self.distance_meters = parse_or_default(parse_distance(&payload.distance));
        self.step_count = (self.distance_meters / STEP_LENGTH_M).floor() as u64;
        self.last_sample_magnitude = 0.0;
        self.paused = true;
        self.phase = SessionPhase::Running;

        tracing::debug!(
            id = payload.id,
            elapsed_seconds = self.elapsed_seconds,
            distance_meters = self.distance_meters,
            "Resumed run"
        );
    }

    /// One clock period has passed.
    pub fn on_tick(&mut self) {
        if self.is_accepting() {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
    }

    /// A new accelerometer reading arrived.
    ///
    /// Samples are ignored entirely while paused, so magnitude tracking
    /// restarts from the last pre-pause reading on resume.
    pub fn on_motion_sample(&mut self, x: f64, y: f64, z: f64) {
        if !self.is_accepting() {
            return;
        }

        let magnitude = (x * x + y * y + z * z).sqrt();
        let delta = magnitude - self.last_sample_magnitude;
        self.last_sample_magnitude = magnitude;

        if delta > STEP_THRESHOLD {
            self.step_count = self.step_count.saturating_add(1);
            self.distance_meters = self.step_count as f64 * STEP_LENGTH_M;
        }
    }

    /// Flip the pause flag and return the new value. No-op unless running.
    pub fn toggle_pause(&mut self) -> bool {
        if self.phase == SessionPhase::Running {
            self.paused = !self.paused;
        }
        self.paused
    }

    /// Finalize the run.
    ///
    /// `existing_id` is `0` for a new run, or the id of the stored run this
    /// recording continues. After this call ticks and samples have no effect.
    pub fn stop(&mut self, user: &str, existing_id: u64) -> RunRecord {
        self.phase = SessionPhase::Stopped;

        let average_speed_kmh = if self.elapsed_seconds > 0 {
            (self.distance_meters / 1000.0) / (self.elapsed_seconds as f64 / 3600.0)
        } else {
            0.0
        };

        tracing::info!(
            user,
            existing_id,
            elapsed_seconds = self.elapsed_seconds,
            steps = self.step_count,
            distance_meters = self.distance_meters,
            "Run finalized"
        );

        RunRecord::new(
            existing_id,
            user,
            self.elapsed_seconds,
            self.distance_meters,
            average_speed_kmh,
            self.clock.today(),
        )
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            elapsed_seconds: self.elapsed_seconds,
            distance_meters: self.distance_meters,
            step_count: self.step_count,
            paused: self.paused,
        }
    }

    fn is_accepting(&self) -> bool {
        self.phase == SessionPhase::Running && !self.paused
    }
}
