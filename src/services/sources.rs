// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Host capabilities injected into recording sessions.
//!
//! A session never reads the wall clock or a sensor directly. The calendar
//! date comes from a [`ClockSource`] and accelerometer readings arrive through
//! a [`MotionSubscription`] handed out by a [`MotionSource`].

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Source of the calendar date stamped on finished runs.
pub trait ClockSource: Send + Sync {
    /// Today's date on the local calendar.
    fn today(&self) -> NaiveDate;
}

/// Local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl ClockSource for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// One 3-axis accelerometer reading, in the sensor's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the acceleration vector.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A live sensor registration.
///
/// Dropping the subscription unregisters the listener.
#[derive(Debug)]
pub struct MotionSubscription {
    samples: mpsc::UnboundedReceiver<MotionSample>,
}

impl MotionSubscription {
    pub fn new(samples: mpsc::UnboundedReceiver<MotionSample>) -> Self {
        Self { samples }
    }

    /// Next reading, or `None` once the sensor side has gone away.
    pub async fn next(&mut self) -> Option<MotionSample> {
        self.samples.recv().await
    }

    /// A reading that has already arrived, without waiting.
    pub fn try_next(&mut self) -> Option<MotionSample> {
        self.samples.try_recv().ok()
    }
}

/// A device motion sensor.
pub trait MotionSource: Send + Sync {
    /// Register a listener. Returns `None` when the device has no accelerometer.
    fn subscribe(&self) -> Option<MotionSubscription>;
}

/// Device without an accelerometer. Runs record time only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMotionSensor;

impl MotionSource for NoMotionSensor {
    fn subscribe(&self) -> Option<MotionSubscription> {
        None
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    sender: Option<mpsc::UnboundedSender<MotionSample>>,
    subscriptions: usize,
}

/// Motion source fed by the host, one sample at a time.
///
/// Used for replaying accelerometer logs from the command line and as the
/// sensor fake in tests. Samples pushed while nobody is subscribed are dropped,
/// like readings from an unregistered sensor.
#[derive(Debug, Clone, Default)]
pub struct ChannelMotionSource {
    state: Arc<Mutex<ChannelState>>,
}

impl ChannelMotionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a sample to the live subscription. Returns whether it was delivered.
    pub fn push(&self, sample: MotionSample) -> bool {
        let state = self.state.lock();
        match &state.sender {
            Some(sender) => sender.send(sample).is_ok(),
            None => false,
        }
    }

    /// Whether a subscription is currently registered.
    pub fn is_subscribed(&self) -> bool {
        self.state
            .lock()
            .sender
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// How many times a listener has been registered.
    pub fn subscriptions(&self) -> usize {
        self.state.lock().subscriptions
    }
}

impl MotionSource for ChannelMotionSource {
    fn subscribe(&self) -> Option<MotionSubscription> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        state.sender = Some(sender);
        state.subscriptions += 1;
        Some(MotionSubscription::new(receiver))
    }
}
