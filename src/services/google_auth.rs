// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google service account authentication for the Sheets API.
//!
//! Signs an RS256 JWT assertion with the service account key and exchanges
//! it for a short-lived bearer token (OAuth2 JWT bearer grant).

use crate::config::ConfigError;
use crate::error::{AppError, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Scopes needed to read and write the spreadsheet.
pub const SHEETS_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a downloaded service account key file that we use.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Claims of the JWT bearer assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

impl ServiceAccountKey {
    /// Load a key from the JSON file downloaded from the Cloud console.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(content)
            .map_err(|e| ConfigError::Invalid(format!("service account key: {}", e)))?;
        if key.client_email.trim().is_empty() {
            return Err(ConfigError::Missing("service account client_email").into());
        }
        Ok(key)
    }

    /// Override the token endpoint (used by tests).
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    pub fn claims(&self, scopes: &[&str], now: u64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign the bearer assertion with the account's RSA key.
    pub fn sign_assertion(&self, scopes: &[&str], now: u64) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| AppError::Store(format!("invalid service account private key: {e}")))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        encode(&header, &self.claims(scopes, now), &key)
            .map_err(|e| AppError::Store(format!("failed signing JWT assertion: {e}")))
    }
}

/// Exchange a signed assertion for a Google access token.
pub async fn fetch_access_token(key: &ServiceAccountKey, scopes: &[&str]) -> Result<String> {
    let http_client = reqwest::Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()
        .map_err(|e| AppError::Store(format!("failed building HTTP client: {e}")))?;

    let assertion = key.sign_assertion(scopes, now_unix_secs())?;

    let response = http_client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| AppError::Store(format!("Google token request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Store(format!(
            "Google token endpoint returned HTTP {}: {}",
            status, body
        )));
    }

    let token: GoogleTokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Store(format!("invalid Google token response: {e}")))?;

    tracing::debug!(
        client_email = %key.client_email,
        expires_in = ?token.expires_in,
        "Obtained Google access token"
    );
    Ok(token.access_token)
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
