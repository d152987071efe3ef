// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod run;

pub use run::{RunPayload, RunRecord, UNSAVED_RUN_ID};
