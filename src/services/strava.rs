// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client and token lifecycle.
//!
//! Handles:
//! - Activity listing (one page per call)
//! - Authorization-code and refresh-token grants
//! - Keeping the stored credential fresh, with a 60 second margin

use crate::db::CredentialStore;
use crate::error::{AppError, Result};
use crate::models::{Credential, RawActivity};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
pub const STRAVA_OAUTH_BASE: &str = "https://www.strava.com/oauth";

/// Scope requested during consent.
pub const STRAVA_SCOPE: &str = "activity:read_all";

/// Margin before token expiration when we proactively refresh.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_base: String,
    oauth_base: String,
}

impl Default for StravaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StravaClient {
    /// Create a client against the public Strava endpoints.
    pub fn new() -> Self {
        Self::with_base_urls(STRAVA_API_BASE, STRAVA_OAUTH_BASE)
    }

    /// Create a client against custom endpoints (used by tests).
    pub fn with_base_urls(api_base: impl Into<String>, oauth_base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            oauth_base: oauth_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// List one page of the athlete's activities started after `after`.
    pub async fn list_activities(
        &self,
        access_token: &str,
        after: i64, // Unix timestamp
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RawActivity>> {
        let url = format!("{}/athlete/activities", self.api_base);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("after", after.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Activity request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
            }

            return Err(AppError::Fetch(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Fetch(format!("JSON parse error: {}", e)))
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(&self, credential: &Credential) -> Result<TokenResponse> {
        self.token_grant(&[
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
            ("refresh_token", credential.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    /// Exchange a one-time authorization code for the initial tokens.
    pub async fn exchange_code(&self, credential: &Credential, code: &str) -> Result<TokenResponse> {
        self.token_grant(&[
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    /// Build the consent URL the user opens in a browser.
    pub fn authorize_url(&self, client_id: &str, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             approval_prompt=auto&\
             state={}",
            self.oauth_base,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            STRAVA_SCOPE,
            urlencoding::encode(state),
        )
    }

    async fn token_grant(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_base))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token endpoint rejected request");
            return Err(AppError::auth_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }
}

/// Token grant response from Strava (athlete info is ignored).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl TokenResponse {
    fn apply_to(self, credential: &mut Credential) {
        credential.access_token = self.access_token;
        credential.refresh_token = self.refresh_token;
        credential.expires_at = self.expires_at;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TokenManager - keeps the credential fresh and persisted
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the refresh policy for the Strava credential.
///
/// Every change to the credential is saved through the [`CredentialStore`]
/// before the new token is returned.
#[derive(Clone)]
pub struct TokenManager<S> {
    client: StravaClient,
    store: S,
}

impl<S: CredentialStore> TokenManager<S> {
    pub fn new(client: StravaClient, store: S) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &StravaClient {
        &self.client
    }

    /// Get an access token valid for at least another minute, refreshing
    /// first if needed.
    pub async fn get_valid_access_token(&self, credential: &mut Credential) -> Result<String> {
        self.get_valid_access_token_at(credential, Utc::now().timestamp())
            .await
    }

    /// Same as [`Self::get_valid_access_token`] with an explicit clock.
    pub async fn get_valid_access_token_at(
        &self,
        credential: &mut Credential,
        now: i64,
    ) -> Result<String> {
        if credential.seconds_remaining(now) > TOKEN_REFRESH_MARGIN_SECS {
            return Ok(credential.access_token.clone());
        }

        tracing::info!(
            expires_at = credential.expires_at,
            "Access token expired or expiring, refreshing"
        );

        let tokens = self.client.refresh_token(credential).await?;
        let mut refreshed = credential.clone();
        tokens.apply_to(&mut refreshed);

        self.store.save(&refreshed)?;
        *credential = refreshed;

        tracing::info!(expires_at = credential.expires_at, "Token refreshed and saved");
        Ok(credential.access_token.clone())
    }

    /// Exchange a consent code for the first token triple and save it.
    pub async fn complete_authorization_code_exchange(
        &self,
        code: &str,
        credential: &Credential,
    ) -> Result<Credential> {
        tracing::info!("Exchanging authorization code for tokens");

        let tokens = self.client.exchange_code(credential, code).await?;
        let mut authorized = credential.clone();
        tokens.apply_to(&mut authorized);

        self.store.save(&authorized)?;

        tracing::info!(
            expires_at = authorized.expires_at,
            "Authorization complete, tokens saved"
        );
        Ok(authorized)
    }
}
