// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Async host for a recording session.
//!
//! One task owns the [`RunRecordingSession`] and is its only writer. It waits
//! on three sources at once:
//! - a one-second interval (never stopped by pause, only gated by it)
//! - the motion subscription, held only while the run is not paused
//! - commands from [`RunRecorder`] handles
//!
//! Every state change is published as a [`SessionSnapshot`] on a watch channel.

use crate::error::{AppError, Result};
use crate::models::RunRecord;
use crate::services::recording::{RunRecordingSession, SessionSnapshot};
use crate::services::sources::{ClockSource, MotionSample, MotionSource, MotionSubscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

/// Period of the elapsed-time clock.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

enum RecorderCommand {
    TogglePause {
        reply: oneshot::Sender<bool>,
    },
    Stop {
        user: String,
        existing_id: u64,
        reply: oneshot::Sender<RunRecord>,
    },
}

/// Handle to a running recording.
///
/// Dropping the handle cancels the recording and releases the motion sensor.
pub struct RunRecorder {
    commands: mpsc::UnboundedSender<RecorderCommand>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl RunRecorder {
    /// Start recording a new run. Must be called within a tokio runtime.
    pub fn start(clock: Arc<dyn ClockSource>, motion: Arc<dyn MotionSource>) -> Self {
        let mut session = RunRecordingSession::new(clock);
        session.start();
        tracing::info!("Recording new run");
        Self::spawn(session, motion)
    }

    /// Continue recording a stored run. The recording starts paused.
    pub fn resume(
        run: &RunRecord,
        clock: Arc<dyn ClockSource>,
        motion: Arc<dyn MotionSource>,
    ) -> Self {
        let mut session = RunRecordingSession::new(clock);
        session.resume_from(run);
        tracing::info!(id = run.id(), "Continuing run");
        Self::spawn(session, motion)
    }

    fn spawn(session: RunRecordingSession, motion: Arc<dyn MotionSource>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(session.snapshot());

        // Register before returning so callers observe the sensor as live.
        let subscription = if session.is_paused() {
            None
        } else {
            motion.subscribe()
        };

        let task = tokio::spawn(drive_session(
            session,
            motion,
            subscription,
            command_rx,
            snapshot_tx,
        ));

        Self {
            commands,
            snapshots,
            task,
        }
    }

    /// Receiver of state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Pause or resume. Returns the new paused state.
    pub async fn toggle_pause(&self) -> Result<bool> {
        let (reply, response) = oneshot::channel();
        self.send(RecorderCommand::TogglePause { reply })?;
        response.await.map_err(|_| AppError::RecorderClosed)
    }

    /// Stop the recording and finalize the run.
    ///
    /// Pass `existing_id = 0` for a new run, or the id of the run being
    /// continued. Safe to call from any task; a second call fails with
    /// [`AppError::RecorderClosed`].
    pub async fn stop(&self, user: &str, existing_id: u64) -> Result<RunRecord> {
        let (reply, response) = oneshot::channel();
        self.send(RecorderCommand::Stop {
            user: user.to_string(),
            existing_id,
            reply,
        })?;
        response.await.map_err(|_| AppError::RecorderClosed)
    }

    /// Whether the recording task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    fn send(&self, command: RecorderCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::RecorderClosed)
    }
}

impl Drop for RunRecorder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Session event loop. Returns after `Stop` or when every handle is gone.
async fn drive_session(
    mut session: RunRecordingSession,
    motion: Arc<dyn MotionSource>,
    mut subscription: Option<MotionSubscription>,
    mut commands: mpsc::UnboundedReceiver<RecorderCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.on_tick();
            }
            sample = next_sample(&mut subscription) => {
                match sample {
                    Some(sample) => session.on_motion_sample(sample.x, sample.y, sample.z),
                    None => {
                        tracing::warn!("Motion sensor went away, recording time only");
                        subscription = None;
                    }
                }
            }
            command = commands.recv() => {
                match command {
                    Some(RecorderCommand::TogglePause { reply }) => {
                        drain_samples(&mut session, &mut subscription);
                        let paused = session.toggle_pause();
                        if paused {
                            subscription = None;
                        } else if subscription.is_none() {
                            subscription = motion.subscribe();
                        }
                        tracing::debug!(paused, "Recording pause toggled");
                        publish(&snapshots, &session);
                        let _ = reply.send(paused);
                    }
                    Some(RecorderCommand::Stop { user, existing_id, reply }) => {
                        drain_samples(&mut session, &mut subscription);
                        subscription = None;
                        let run = session.stop(&user, existing_id);
                        publish(&snapshots, &session);
                        let _ = reply.send(run);
                        break;
                    }
                    None => {
                        tracing::debug!("Recorder dropped, discarding run");
                        break;
                    }
                }
            }
        }
        publish(&snapshots, &session);
    }

    // Unregister before the task is reported finished.
    drop(subscription);
}

/// Next sample from the subscription; pending forever without one.
async fn next_sample(subscription: &mut Option<MotionSubscription>) -> Option<MotionSample> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

/// Apply samples already queued when a command arrives, so readings taken
/// before a pause or stop still count.
fn drain_samples(
    session: &mut RunRecordingSession,
    subscription: &mut Option<MotionSubscription>,
) {
    if let Some(subscription) = subscription {
        while let Some(sample) = subscription.try_next() {
            session.on_motion_sample(sample.x, sample.y, sample.z);
        }
    }
}

fn publish(snapshots: &watch::Sender<SessionSnapshot>, session: &RunRecordingSession) {
    let next = session.snapshot();
    snapshots.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}
