// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-time Strava consent: a loopback listener that captures the
//! authorization code from the OAuth redirect.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::db::CredentialStore;
use crate::error::{AppError, Result};
use crate::models::Credential;
use crate::services::TokenManager;

/// Where the redirect listener binds.
pub const CALLBACK_ADDR: &str = "localhost:8089";

/// How long to wait for the user to finish consent.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

const SUCCESS_PAGE: &str = "<html><body><h2>Authorization successful!</h2>\
    <p>You can close this tab and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<html><body><h2>Authorization failed</h2>\
    <p>Return to the terminal for details.</p></body></html>";

/// Outcome delivered by the callback: the code, or the provider's error.
type CallbackOutcome = std::result::Result<String, String>;

/// Shared state for the callback route.
///
/// The sender is taken by the first valid callback, so the code is
/// delivered exactly once.
pub struct CallbackState {
    expected_state: String,
    sender: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
}

impl CallbackState {
    pub fn new(expected_state: impl Into<String>) -> (Arc<Self>, oneshot::Receiver<CallbackOutcome>) {
        let (tx, rx) = oneshot::channel();
        let state = Arc::new(Self {
            expected_state: expected_state.into(),
            sender: Mutex::new(Some(tx)),
        });
        (state, rx)
    }

    fn take_sender(&self) -> Option<oneshot::Sender<CallbackOutcome>> {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

pub fn routes() -> Router<Arc<CallbackState>> {
    Router::new().route("/callback", get(auth_callback))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth redirect target: hand the code to the waiting caller.
async fn auth_callback(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    if params.state.as_deref() != Some(state.expected_state.as_str()) {
        tracing::warn!("OAuth callback with missing or mismatched state, ignoring");
        return (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE));
    }

    let outcome = match (params.error, params.code) {
        (Some(error), _) => Err(error),
        (None, Some(code)) if !code.is_empty() => Ok(code),
        (None, _) => Err("no authorization code in redirect".to_string()),
    };

    let Some(sender) = state.take_sender() else {
        tracing::debug!("OAuth callback already handled");
        return (StatusCode::GONE, Html(FAILURE_PAGE));
    };

    let page = if outcome.is_ok() {
        (StatusCode::OK, Html(SUCCESS_PAGE))
    } else {
        (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE))
    };

    // The receiver only disappears once the caller has given up waiting
    let _ = sender.send(outcome);
    page
}

/// Random hex token for the OAuth `state` parameter.
pub fn generate_state() -> Result<String> {
    let mut bytes = [0u8; 16];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG unavailable")))?;
    Ok(hex::encode(bytes))
}

/// Loopback listener bound before the browser is opened.
pub struct CallbackListener {
    listener: tokio::net::TcpListener,
    local_addr: SocketAddr,
    expected_state: String,
}

impl CallbackListener {
    pub async fn bind(addr: &str, expected_state: impl Into<String>) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::debug!(address = %local_addr, "OAuth callback listener bound");
        Ok(Self {
            listener,
            local_addr,
            expected_state: expected_state.into(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Redirect URI to register with the consent request.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.local_addr.port())
    }

    /// Serve the callback route until one code arrives or `timeout` passes.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String> {
        let Self {
            listener,
            expected_state,
            ..
        } = self;
        let (state, code_rx) = CallbackState::new(expected_state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = super::create_router(state);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let received = tokio::time::timeout(timeout, code_rx).await;

        let _ = shutdown_tx.send(());
        let _ = tokio::time::timeout(Duration::from_secs(2), server).await;

        match received {
            Err(_) => Err(AppError::Auth(format!(
                "No authorization code received within {} seconds",
                timeout.as_secs()
            ))),
            Ok(Err(_)) => Err(AppError::Internal(anyhow::anyhow!(
                "OAuth callback channel closed"
            ))),
            Ok(Ok(Err(error))) => Err(AppError::Auth(format!(
                "Strava authorization was not granted: {}",
                error
            ))),
            Ok(Ok(Ok(code))) => Ok(code),
        }
    }
}

/// Run the interactive consent flow and save the resulting tokens.
///
/// Opens the browser (printing the URL as a fallback), waits for the
/// redirect, then exchanges the code.
pub async fn run_consent_flow<S: CredentialStore>(
    tokens: &TokenManager<S>,
    credential: &Credential,
) -> Result<Credential> {
    let oauth_state = generate_state()?;
    let listener = CallbackListener::bind(CALLBACK_ADDR, oauth_state.clone()).await?;
    let auth_url =
        tokens
            .client()
            .authorize_url(&credential.client_id, &listener.redirect_uri(), &oauth_state);

    tracing::info!(client_id = %credential.client_id, "Starting Strava authorization");
    eprintln!("\nOpening Strava in your browser for authorization...");
    eprintln!("If the browser doesn't open, visit:\n\n{}\n", auth_url);
    if let Err(e) = open::that(&auth_url) {
        tracing::warn!(error = %e, "Failed to open browser");
    }
    eprintln!(
        "Waiting for authorization (timeout: {} seconds)...",
        CALLBACK_TIMEOUT.as_secs()
    );

    let code = listener.wait_for_code(CALLBACK_TIMEOUT).await?;
    tokens
        .complete_authorization_code_exchange(&code, credential)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state_is_random_hex() {
        let a = generate_state().unwrap();
        let b = generate_state().unwrap();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_sender_taken_once() {
        let (state, _rx) = CallbackState::new("s");
        assert!(state.take_sender().is_some());
        assert!(state.take_sender().is_none());
    }
}
