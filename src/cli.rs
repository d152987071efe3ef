// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line host.
//!
//! `record` and `continue` read accelerometer samples from stdin, one
//! `x,y,z` reading per line. A line with `p` toggles pause and `q` (or EOF)
//! stops the run and saves it.

use crate::models::{RunRecord, UNSAVED_RUN_ID};
use crate::services::{ChannelMotionSource, MotionSample, RunRecorder, SystemClock};
use crate::AppState;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "fit-tracker",
    version,
    about = "Record runs from accelerometer samples and keep them in the runs API"
)]
pub struct Cli {
    /// User whose runs are recorded and listed (overrides FIT_USER)
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Runs API base URL (overrides FIT_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List runs, newest first
    List,
    /// Show one run
    Show { id: u64 },
    /// Delete a run
    Delete { id: u64 },
    /// Record a new run from stdin samples
    Record,
    /// Continue a stored run (starts paused)
    Continue { id: u64 },
}

/// One line of recording input.
#[derive(Debug, Clone, PartialEq)]
pub enum InputLine {
    Sample(MotionSample),
    TogglePause,
    Stop,
    Blank,
}

/// Parse a recording input line: `x,y,z` (commas or whitespace), `p` or `q`.
pub fn parse_input_line(line: &str) -> Option<InputLine> {
    let line = line.trim();
    match line {
        "" => return Some(InputLine::Blank),
        "p" | "P" => return Some(InputLine::TogglePause),
        "q" | "Q" => return Some(InputLine::Stop),
        _ => {}
    }

    let values: Vec<f64> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse::<f64>)
        .collect::<std::result::Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        [x, y, z] if x.is_finite() && y.is_finite() && z.is_finite() => {
            Some(InputLine::Sample(MotionSample::new(*x, *y, *z)))
        }
        _ => None,
    }
}

/// Run a parsed command against the runs API.
pub async fn run(cli: Cli, state: AppState) -> Result<()> {
    let user = state.config.require_user()?.to_string();

    match cli.command {
        Command::List => {
            load(&state, &user).await?;
            let runs = state.runs.runs();
            if runs.is_empty() {
                println!("No runs for {}", user);
            }
            for run in &runs {
                println!("{}", summary_line(run));
            }
        }
        Command::Show { id } => {
            let run = find(&state, &user, id).await?;
            println!("{}", detail_text(&run));
        }
        Command::Delete { id } => {
            find(&state, &user, id).await?;
            state.runs.delete(id).await;
            check_sync(&state)?;
            println!("Deleted run {}", id);
        }
        Command::Record => {
            let run = record(&user, None).await?;
            save(&state, run).await?;
        }
        Command::Continue { id } => {
            let stored = find(&state, &user, id).await?;
            let run = record(&user, Some(stored)).await?;
            save(&state, run).await?;
        }
    }

    Ok(())
}

async fn load(state: &AppState, user: &str) -> Result<()> {
    state.runs.load(user).await;
    check_sync(state)
}

async fn find(state: &AppState, user: &str, id: u64) -> Result<RunRecord> {
    load(state, user).await?;
    state
        .runs
        .find(id)
        .with_context(|| format!("No run {} for {}", id, user))
}

async fn save(state: &AppState, run: RunRecord) -> Result<()> {
    let id = run.id();
    state.runs.save(run).await;
    check_sync(state)?;

    // New runs are prepended and get their assigned id written back.
    let saved = if id == UNSAVED_RUN_ID {
        state.runs.runs().into_iter().next()
    } else {
        state.runs.find(id)
    };
    if let Some(saved) = saved {
        println!("Saved\n{}", detail_text(&saved));
    }
    Ok(())
}

/// Turn the list's transient error into a command failure.
fn check_sync(state: &AppState) -> Result<()> {
    if let Some(error) = state.runs.snapshot().error {
        state.runs.dismiss_error();
        bail!(error);
    }
    Ok(())
}

/// Record from stdin until `q` or EOF.
async fn record(user: &str, resume: Option<RunRecord>) -> Result<RunRecord> {
    let motion = ChannelMotionSource::new();
    let clock = Arc::new(SystemClock);

    let (recorder, existing_id) = match &resume {
        Some(run) => (
            RunRecorder::resume(run, clock, Arc::new(motion.clone())),
            run.id(),
        ),
        None => (
            RunRecorder::start(clock, Arc::new(motion.clone())),
            UNSAVED_RUN_ID,
        ),
    };

    if recorder.snapshot().paused {
        println!("Paused at {}. Enter `p` to resume.", recorder.snapshot().elapsed_display());
    } else {
        println!("Recording. Enter x,y,z samples, `p` to pause, `q` to stop.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match parse_input_line(&line) {
            Some(InputLine::Sample(sample)) => {
                motion.push(sample);
            }
            Some(InputLine::TogglePause) => {
                let paused = recorder.toggle_pause().await?;
                let snapshot = recorder.snapshot();
                println!(
                    "{} at {} ({} steps)",
                    if paused { "Paused" } else { "Resumed" },
                    snapshot.elapsed_display(),
                    snapshot.step_count
                );
            }
            Some(InputLine::Stop) => break,
            Some(InputLine::Blank) => {}
            None => tracing::warn!(line = %line, "Ignoring unreadable input line"),
        }
    }

    Ok(recorder.stop(user, existing_id).await?)
}

fn summary_line(run: &RunRecord) -> String {
    format!(
        "#{:<6} {}  {}  {}  {}",
        run.id(),
        run.date_display(),
        run.elapsed_display(),
        run.distance_display(),
        run.speed_display()
    )
}

fn detail_text(run: &RunRecord) -> String {
    format!(
        "Run #{}\n  User:          {}\n  Time:          {}\n  Distance:      {}\n  Average speed: {}\n  Date:          {}",
        run.id(),
        run.user(),
        run.elapsed_display(),
        run.distance_display(),
        run.speed_display(),
        run.date_display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_sample_lines() {
        assert_eq!(
            parse_input_line("0.1,0.2,9.8"),
            Some(InputLine::Sample(MotionSample::new(0.1, 0.2, 9.8)))
        );
        assert_eq!(
            parse_input_line("  1 2\t3 "),
            Some(InputLine::Sample(MotionSample::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            parse_input_line("1, 2, 3"),
            Some(InputLine::Sample(MotionSample::new(1.0, 2.0, 3.0)))
        );
    }

    #[test]
    fn test_parse_control_lines() {
        assert_eq!(parse_input_line("p"), Some(InputLine::TogglePause));
        assert_eq!(parse_input_line("Q"), Some(InputLine::Stop));
        assert_eq!(parse_input_line("   "), Some(InputLine::Blank));
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert_eq!(parse_input_line("1,2"), None);
        assert_eq!(parse_input_line("1,2,3,4"), None);
        assert_eq!(parse_input_line("a,b,c"), None);
        assert_eq!(parse_input_line("1,NaN,3"), None);
    }

    #[test]
    fn test_detail_text() {
        let run = RunRecord::new(
            12,
            "ana",
            3600,
            750.0,
            0.75,
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        );
        let text = detail_text(&run);
        assert!(text.starts_with("Run #12"));
        assert!(text.contains("01:00:00"));
        assert!(text.contains("750.00 metros"));
        assert!(text.contains("0.75 km/h"));
        assert!(text.contains("01/09/2025"));
    }

    #[test]
    fn test_cli_parses_global_flags_after_command() {
        let cli = Cli::try_parse_from(["fit-tracker", "show", "7", "--user", "ana"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("ana"));
        assert!(matches!(cli.command, Command::Show { id: 7 }));
    }
}
