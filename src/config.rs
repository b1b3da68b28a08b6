//! Application configuration loaded from the JSON config file.
//!
//! The same file holds the Strava credential, which is rewritten in place
//! whenever tokens change (see [`crate::db::ConfigFileCredentialStore`]).

use crate::models::{ColumnMapping, Credential, DistanceUnit};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "STRAVA_SHEETS_CONFIG";

/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_activity_type() -> Option<String> {
    Some("Run".to_string())
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Strava OAuth client and tokens
    pub strava: Credential,
    /// Google service account and target spreadsheet
    pub google: GoogleConfig,
    /// Unit for distance and pace
    #[serde(default)]
    pub units: DistanceUnit,
    /// Only activities of this type are synced (`null` syncs everything)
    #[serde(default = "default_activity_type")]
    pub activity_type: Option<String>,
    /// Worksheet column layout
    pub sheet_mapping: ColumnMapping,
}

/// Google Sheets target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Path to the service account key JSON
    pub service_account_json: PathBuf,
    /// Spreadsheet document ID (from its URL)
    pub spreadsheet_id: String,
}

impl Config {
    /// Pick the config path: explicit argument, then `STRAVA_SHEETS_CONFIG`
    /// (a `.env` file is honoured), then `config.json`.
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        dotenvy::dotenv().ok(); // Load .env file if present
        env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load and validate configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Check fields that must be present for any run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strava.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("strava.client_id"));
        }
        if self.strava.client_secret.trim().is_empty() {
            return Err(ConfigError::Missing("strava.client_secret"));
        }
        self.sheet_mapping
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("sheet_mapping: {}", e)))?;
        Ok(())
    }

    /// The consent flow has been run at least once.
    pub fn check_authorized(&self) -> Result<(), ConfigError> {
        if !self.strava.is_authorized() {
            return Err(ConfigError::NotAuthorized);
        }
        Ok(())
    }

    /// Preflight for the sync path: tokens exist and the Google key file is
    /// reachable.
    pub fn check_sync_ready(&self) -> Result<(), ConfigError> {
        self.check_authorized()?;
        if self.google.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing("google.spreadsheet_id"));
        }
        if !self.google.service_account_json.exists() {
            return Err(ConfigError::Invalid(format!(
                "Google service account file not found at: {}",
                self.google.service_account_json.display()
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required config value: {0}")]
    Missing(&'static str),

    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Cannot write config file: {0}")]
    Write(String),

    #[error("No Strava tokens found. Run with --auth first.")]
    NotAuthorized,
}
