// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Every network failure is fatal for the run. Dates that have no matching
//! sheet row are reported in the sync summary and never surface here.

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Strava token endpoint failure (refresh or code exchange).
    #[error("Strava auth error: {0}")]
    Auth(String),

    /// Strava activities endpoint failure.
    #[error("Strava fetch error: {0}")]
    Fetch(String),

    /// Google authentication or Sheets API failure.
    #[error("Sheet store error: {0}")]
    Store(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build an auth error from a non-success token endpoint response.
    pub fn auth_status(status: reqwest::StatusCode, body: &str) -> Self {
        AppError::Auth(format!("HTTP {}: {}", status, body))
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Auth(_) => 3,
            AppError::Fetch(_) => 4,
            AppError::Store(_) => 5,
            AppError::Io(_) | AppError::Internal(_) => 1,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
