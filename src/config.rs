// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

/// Base URL of the hosted mock runs API.
pub const DEFAULT_API_URL: &str = "https://693a7e659b80ba7262ca23bb.mockapi.io";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runs API base URL, without a trailing slash
    pub api_url: String,
    /// Current user (there is no real login, the name is trusted as-is)
    pub user: Option<String>,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            user: Some("test_user".to_string()),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `FIT_API_URL`: runs API base URL (defaults to the hosted mock API)
    /// - `FIT_USER`: current user name (optional here, required by commands)
    /// - `FIT_HTTP_TIMEOUT_SECS`: request timeout in seconds (default 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let http_timeout = match env::var("FIT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    name: "FIT_HTTP_TIMEOUT_SECS",
                    value: raw,
                })?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url: normalize_api_url(
                &env::var("FIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            ),
            user: env::var("FIT_USER")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            http_timeout,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, user: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = normalize_api_url(&url);
        }
        if let Some(user) = user.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            self.user = Some(user);
        }
        self
    }

    /// The configured user, or an error naming the variable to set.
    pub fn require_user(&self) -> Result<&str, ConfigError> {
        self.user.as_deref().ok_or(ConfigError::Missing("FIT_USER"))
    }
}

/// Strip trailing slashes so paths can be joined with `format!("{}/runs", ..)`.
fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set env vars for test
        env::set_var("FIT_API_URL", "https://runs.example.com/");
        env::set_var("FIT_USER", "  ana  ");
        env::remove_var("FIT_HTTP_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_url, "https://runs.example.com");
        assert_eq!(config.user.as_deref(), Some("ana"));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::default()
            .with_overrides(Some("http://127.0.0.1:9000//".to_string()), Some("luis".into()));

        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.require_user().unwrap(), "luis");
    }

    #[test]
    fn test_blank_user_override_is_ignored() {
        let config = Config::default().with_overrides(None, Some("   ".to_string()));
        assert_eq!(config.user.as_deref(), Some("test_user"));
    }

    #[test]
    fn test_require_user_missing() {
        let config = Config {
            user: None,
            ..Config::default()
        };
        assert!(matches!(
            config.require_user(),
            Err(ConfigError::Missing("FIT_USER"))
        ));
    }
}
