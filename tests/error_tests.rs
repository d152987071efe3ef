// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fit_tracker::config::ConfigError;
use fit_tracker::error::AppError;

#[test]
fn test_is_not_found_matches() {
    assert!(AppError::NotFound("run 4".to_string()).is_not_found());

    assert!(!AppError::Network("HTTP 500".to_string()).is_not_found());
    assert!(!AppError::RecorderClosed.is_not_found());
}

#[test]
fn test_is_network_matches() {
    assert!(AppError::Network("connection refused".to_string()).is_network());

    assert!(!AppError::NotFound("run 4".to_string()).is_network());
    assert!(!AppError::Internal(anyhow::anyhow!("bug")).is_network());
}

#[test]
fn test_display() {
    assert_eq!(
        AppError::NotFound("run 4".to_string()).to_string(),
        "Resource not found: run 4"
    );
    assert_eq!(
        AppError::Network("HTTP 503 Service Unavailable: ".to_string()).to_string(),
        "Network error: HTTP 503 Service Unavailable: "
    );
    assert_eq!(
        AppError::RecorderClosed.to_string(),
        "Run recorder is no longer running"
    );
}

#[test]
fn test_config_error_converts() {
    let err: AppError = ConfigError::Missing("FIT_USER").into();
    assert!(matches!(err, AppError::Config(ConfigError::Missing("FIT_USER"))));
    assert!(err.to_string().starts_with("Configuration error:"));
    assert!(err.to_string().contains("FIT_USER"));
}
