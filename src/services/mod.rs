// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod google_auth;
pub mod reconcile;
pub mod sheets;
pub mod strava;
pub mod sync;

pub use activity::ActivityFetcher;
pub use google_auth::ServiceAccountKey;
pub use reconcile::{ReconcileOutcome, SheetReconciler};
pub use sheets::{GoogleSheet, MemorySheet, TabularStore};
pub use strava::{StravaClient, TokenManager};
pub use sync::SyncService;
