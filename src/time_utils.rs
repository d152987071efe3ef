// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for the run wire formats.
//!
//! The runs API stores every measurement as display text:
//! - elapsed time as `HH:MM:SS` (hours widen past 99)
//! - distance as `"<x.xx> metros"`
//! - average speed as `"<x.xx> km/h"`
//! - date as `dd/MM/yyyy`

use chrono::NaiveDate;

/// `chrono` format string for run dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const DISTANCE_SUFFIX: &str = " metros";
const SPEED_SUFFIX: &str = " km/h";

/// A wire value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid elapsed time: {0:?}")]
    ElapsedTime(String),

    #[error("Invalid distance: {0:?}")]
    Distance(String),

    #[error("Invalid speed: {0:?}")]
    Speed(String),

    #[error("Invalid date: {0:?}")]
    Date(String),
}

/// Format whole seconds as `HH:MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse `H:MM:SS` into whole seconds.
///
/// Exactly three `:`-separated unsigned integers are required. Minutes and
/// seconds are not range-checked, so `0:90:00` is 5400 seconds.
pub fn parse_elapsed(value: &str) -> Result<u64, ParseError> {
    let err = || ParseError::ElapsedTime(value.to_string());

    let parts: Vec<&str> = value.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(err());
    };

    let hours: u64 = hours.parse().map_err(|_| err())?;
    let minutes: u64 = minutes.parse().map_err(|_| err())?;
    let seconds: u64 = seconds.parse().map_err(|_| err())?;

    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or_else(err)
}

/// Format meters as `"<x.xx> metros"`.
pub fn format_distance(meters: f64) -> String {
    format!("{:.2}{}", meters, DISTANCE_SUFFIX)
}

/// Parse `"<x.xx> metros"` into meters.
///
/// A decimal comma is accepted (`"12,50 metros"`), since older clients wrote
/// the value with the device locale.
pub fn parse_distance(value: &str) -> Result<f64, ParseError> {
    parse_measure(value, DISTANCE_SUFFIX).ok_or_else(|| ParseError::Distance(value.to_string()))
}

/// Format km/h as `"<x.xx> km/h"`.
pub fn format_speed(kmh: f64) -> String {
    format!("{:.2}{}", kmh, SPEED_SUFFIX)
}

/// Parse `"<x.xx> km/h"` into km/h.
pub fn parse_speed(value: &str) -> Result<f64, ParseError> {
    parse_measure(value, SPEED_SUFFIX).ok_or_else(|| ParseError::Speed(value.to_string()))
}

/// Format a run date as `dd/MM/yyyy`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `dd/MM/yyyy` run date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ParseError::Date(value.to_string()))
}

/// Unwrap a parse result, degrading to the type's default on error.
pub fn parse_or_default<T: Default>(result: Result<T, ParseError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Malformed run value, using default");
        T::default()
    })
}

/// Strip a unit suffix and parse the remaining non-negative finite number.
fn parse_measure(value: &str, suffix: &str) -> Option<f64> {
    let number = value.replace(suffix, "").replace(',', ".");
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
