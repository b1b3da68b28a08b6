// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use strava_sheets_sync::models::Credential;
use strava_sheets_sync::services::StravaClient;
use wiremock::MockServer;

/// Strava client pointed at a mock server (`/api/v3` and `/oauth`).
#[allow(dead_code)]
pub fn strava_client(server: &MockServer) -> StravaClient {
    StravaClient::with_base_urls(
        format!("{}/api/v3", server.uri()),
        format!("{}/oauth", server.uri()),
    )
}

/// An authorized credential expiring at `expires_at`.
#[allow(dead_code)]
pub fn credential(expires_at: i64) -> Credential {
    Credential {
        client_id: "12345".to_string(),
        client_secret: "shh".to_string(),
        access_token: "old-access".to_string(),
        refresh_token: "old-refresh".to_string(),
        expires_at,
    }
}

/// A summary activity as Strava returns it.
#[allow(dead_code)]
pub fn activity_json(activity_type: &str, distance: f64, moving_time: u64, start: &str) -> Value {
    json!({
        "id": 1,
        "name": format!("{} on {}", activity_type, &start[..10]),
        "type": activity_type,
        "distance": distance,
        "moving_time": moving_time,
        "elapsed_time": moving_time + 60,
        "start_date": start,
        "start_date_local": start,
    })
}

/// `count` identical runs, for pagination tests.
#[allow(dead_code)]
pub fn runs(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|_| activity_json("Run", 5000.0, 1500, "2024-03-15T07:00:00Z"))
            .collect(),
    )
}

/// Path of a file under `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
