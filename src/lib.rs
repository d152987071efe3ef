// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fit-Tracker: record runs from motion samples and keep them in a runs API
//!
//! This crate provides the run recording state machine, its async driver,
//! the optimistic run list, and the REST repository the runs are stored in.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::RunListController;
use store::HttpRunRepository;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub runs: RunListController<HttpRunRepository>,
}

impl AppState {
    /// Build the state for a config, connecting the run list to the runs API.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let repo = HttpRunRepository::from_config(&config)?;
        Ok(Self {
            config,
            runs: RunListController::new(repo),
        })
    }
}
