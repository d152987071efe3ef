// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fit-Tracker command-line client
//!
//! Records runs from accelerometer samples and manages them in the runs API.

use clap::Parser;
use fit_tracker::{cli::Cli, config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment (and .env), then apply flags
    let config = Config::from_env()?.with_overrides(cli.api_url.clone(), cli.user.clone());

    // Logs go to stderr so command output stays on stdout
    init_logging();
    tracing::debug!(api_url = %config.api_url, "Configuration loaded");

    let state = AppState::from_config(config)?;
    fit_tracker::cli::run(cli, state).await
}

/// Initialize structured logging.
///
/// `RUST_LOG` selects levels; `LOG_FORMAT=json` switches to JSON lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fit_tracker=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
