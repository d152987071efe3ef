// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - run recording and run list logic.

pub mod recorder;
pub mod recording;
pub mod run_list;
pub mod sources;

pub use recorder::RunRecorder;
pub use recording::{RunRecordingSession, SessionPhase, SessionSnapshot};
pub use run_list::{RunListController, RunListSnapshot};
pub use sources::{
    ChannelMotionSource, ClockSource, FixedClock, MotionSample, MotionSource, MotionSubscription,
    NoMotionSensor, SystemClock,
};
