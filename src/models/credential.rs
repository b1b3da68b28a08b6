// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava OAuth credential.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strava client credentials plus the current token triple.
///
/// Serialized as the `strava` section of the config file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Strava OAuth client ID
    pub client_id: String,
    /// Strava OAuth client secret
    pub client_secret: String,
    /// Short-lived bearer token
    #[serde(default)]
    pub access_token: String,
    /// Long-lived refresh token (empty until the consent flow has run)
    #[serde(default)]
    pub refresh_token: String,
    /// Access token expiry (Unix seconds)
    #[serde(rename = "token_expires_at", default)]
    pub expires_at: i64,
}

impl Credential {
    /// Whether the one-time consent flow has produced a refresh token.
    pub fn is_authorized(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }

    /// Seconds left before the access token expires.
    pub fn seconds_remaining(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
