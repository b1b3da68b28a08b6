// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers for the local OAuth redirect listener.

pub mod auth;

pub use auth::{run_consent_flow, CallbackListener, CallbackState};

use axum::Router;
use std::sync::Arc;

/// Build the callback router.
pub fn create_router(state: Arc<CallbackState>) -> Router {
    auth::routes().with_state(state)
}
