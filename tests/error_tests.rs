// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use strava_sheets_sync::config::ConfigError;
use strava_sheets_sync::error::AppError;

#[test]
fn test_exit_codes_by_category() {
    assert_eq!(AppError::Config(ConfigError::NotAuthorized).exit_code(), 2);
    assert_eq!(AppError::Auth("HTTP 401".to_string()).exit_code(), 3);
    assert_eq!(AppError::Fetch("HTTP 500".to_string()).exit_code(), 4);
    assert_eq!(AppError::Store("HTTP 403".to_string()).exit_code(), 5);
    assert_eq!(
        AppError::Internal(anyhow::anyhow!("boom")).exit_code(),
        1
    );
}

#[test]
fn test_auth_status_includes_status_and_body() {
    let err = AppError::auth_status(reqwest::StatusCode::BAD_REQUEST, r#"{"message":"Bad Request"}"#);
    let msg = err.to_string();
    assert!(msg.contains("400"));
    assert!(msg.contains("Bad Request"));
}

#[test]
fn test_config_error_message_is_transparent() {
    let err: AppError = ConfigError::Missing("strava.client_id").into();
    assert_eq!(
        err.to_string(),
        "Missing required config value: strava.client_id"
    );
}
