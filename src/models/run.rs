// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run record model and its wire representation.

use crate::time_utils::{
    format_date, format_distance, format_elapsed, format_speed, parse_date, parse_distance,
    parse_elapsed, parse_or_default, parse_speed, ParseError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Id of a run that has not been persisted yet.
pub const UNSAVED_RUN_ID: u64 = 0;

/// One completed or in-progress run.
///
/// Values are immutable: editing a run produces a new record with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    id: u64,
    user: String,
    elapsed_seconds: u64,
    distance_meters: f64,
    average_speed_kmh: f64,
    date: NaiveDate,
}

impl RunRecord {
    /// Build a run record. Negative measurements are clamped to zero.
    pub fn new(
        id: u64,
        user: impl Into<String>,
        elapsed_seconds: u64,
        distance_meters: f64,
        average_speed_kmh: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            user: user.into(),
            elapsed_seconds,
            distance_meters: distance_meters.max(0.0),
            average_speed_kmh: average_speed_kmh.max(0.0),
            date,
        }
    }

    /// Remote identity, or [`UNSAVED_RUN_ID`].
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the remote store has assigned an id to this run.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_RUN_ID
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_secs(self.elapsed_seconds)
    }

    pub fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Copy of this run under another id.
    pub fn with_id(&self, id: u64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    /// Distance as `"<x.xx> metros"`.
    pub fn distance_display(&self) -> String {
        format_distance(self.distance_meters)
    }

    /// Average speed as `"<x.xx> km/h"`.
    pub fn speed_display(&self) -> String {
        format_speed(self.average_speed_kmh)
    }

    /// Date as `dd/MM/yyyy`.
    pub fn date_display(&self) -> String {
        format_date(self.date)
    }
}

/// Run as exchanged with the runs API.
///
/// Every measurement travels as display text. The API has served ids both as
/// numbers and as numeric strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPayload {
    #[serde(
        default,
        deserialize_with = "deserialize_id",
        skip_serializing_if = "is_unsaved"
    )]
    pub id: u64,
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "tiempo")]
    pub elapsed: String,
    #[serde(rename = "distancia")]
    pub distance: String,
    #[serde(rename = "velocidad")]
    pub speed: String,
    #[serde(rename = "fecha")]
    pub date: String,
}

impl From<&RunRecord> for RunPayload {
    fn from(run: &RunRecord) -> Self {
        Self {
            id: run.id,
            user: run.user.clone(),
            elapsed: run.elapsed_display(),
            distance: run.distance_display(),
            speed: run.speed_display(),
            date: run.date_display(),
        }
    }
}

impl TryFrom<RunPayload> for RunRecord {
    type Error = ParseError;

    /// Decode a payload. Malformed measurements degrade to zero; a malformed
    /// date is an error since there is no meaningful default.
    fn try_from(payload: RunPayload) -> Result<Self, Self::Error> {
        let date = parse_date(&payload.date)?;
        Ok(RunRecord::new(
            payload.id,
            payload.user,
            parse_or_default(parse_elapsed(&payload.elapsed)),
            parse_or_default(parse_distance(&payload.distance)),
            parse_or_default(parse_speed(&payload.speed)),
            date,
        ))
    }
}

fn is_unsaved(id: &u64) -> bool {
    *id == UNSAVED_RUN_ID
}

/// Accept `12` or `"12"`.
fn deserialize_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid run id: {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run(id: u64) -> RunRecord {
        RunRecord::new(
            id,
            "ana",
            3723,
            1500.0,
            1.45,
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
        )
    }

    #[test]
    fn test_payload_uses_wire_field_names() {
        let payload = RunPayload::from(&sample_run(7));
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "usuario": "ana",
                "tiempo": "01:02:03",
                "distancia": "1500.00 metros",
                "velocidad": "1.45 km/h",
                "fecha": "02/11/2025",
            })
        );
    }

    #[test]
    fn test_unsaved_payload_omits_id() {
        let payload = RunPayload::from(&sample_run(UNSAVED_RUN_ID));
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_payload_accepts_string_ids() {
        let json = r#"{"id":"42","usuario":"ana","tiempo":"0:10:00","distancia":"1,50 metros","velocidad":"0.01 km/h","fecha":"01/01/2026"}"#;
        let payload: RunPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.id, 42);

        let run = RunRecord::try_from(payload).unwrap();
        assert_eq!(run.id(), 42);
        assert_eq!(run.elapsed_seconds(), 600);
        assert_eq!(run.distance_meters(), 1.5);
        assert!(run.is_persisted());
    }

    #[test]
    fn test_payload_rejects_non_numeric_id() {
        let json = r#"{"id":"abc","usuario":"ana","tiempo":"","distancia":"","velocidad":"","fecha":"01/01/2026"}"#;
        assert!(serde_json::from_str::<RunPayload>(json).is_err());
    }

    #[test]
    fn test_malformed_measurements_degrade_to_zero() {
        let payload = RunPayload {
            id: 3,
            user: "ana".to_string(),
            elapsed: "soon".to_string(),
            distance: "far".to_string(),
            speed: "quick".to_string(),
            date: "15/06/2025".to_string(),
        };

        let run = RunRecord::try_from(payload).unwrap();
        assert_eq!(run.elapsed_seconds(), 0);
        assert_eq!(run.distance_meters(), 0.0);
        assert_eq!(run.average_speed_kmh(), 0.0);
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        let mut payload = RunPayload::from(&sample_run(3));
        payload.date = "yesterday".to_string();
        assert_eq!(
            RunRecord::try_from(payload),
            Err(ParseError::Date("yesterday".to_string()))
        );
    }

    #[test]
    fn test_with_id_keeps_measurements() {
        let run = sample_run(UNSAVED_RUN_ID);
        let saved = run.with_id(9);
        assert_eq!(saved.id(), 9);
        assert_eq!(saved.user(), run.user());
        assert_eq!(saved.elapsed_display(), run.elapsed_display());
        assert!(!run.is_persisted());
    }

    #[test]
    fn test_new_clamps_negative_values() {
        let run = RunRecord::new(
            1,
            "ana",
            0,
            -5.0,
            -1.0,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert_eq!(run.distance_meters(), 0.0);
        assert_eq!(run.average_speed_kmh(), 0.0);
    }
}
