// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity paging, filtering and normalization against a mock Strava API.

mod common;

use serde_json::json;
use strava_sheets_sync::error::AppError;
use strava_sheets_sync::models::DistanceUnit;
use strava_sheets_sync::services::ActivityFetcher;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AFTER: i64 = 1_710_400_000;

async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value, expect: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", page))
        .and(query_param("per_page", "50"))
        .and(query_param("after", AFTER.to_string()))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expect)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pages_until_short_page() {
    let server = MockServer::start().await;
    mount_page(&server, "1", common::runs(50), 1).await;
    mount_page(&server, "2", common::runs(50), 1).await;
    mount_page(&server, "3", common::runs(7), 1).await;
    mount_page(&server, "4", common::runs(0), 0).await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Mi);
    let raw = fetcher.fetch_all("tok", AFTER).await.unwrap();

    assert_eq!(raw.len(), 107);
}

#[tokio::test]
async fn test_empty_first_page_is_not_an_error() {
    let server = MockServer::start().await;
    mount_page(&server, "1", json!([]), 1).await;
    mount_page(&server, "2", json!([]), 0).await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Mi);
    let records = fetcher
        .fetch_activities("tok", AFTER, Some("Run"))
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_filters_by_type_and_normalizes() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        json!([
            common::activity_json("Run", 10000.0, 3000, "2024-03-15T07:30:00Z"),
            common::activity_json("Ride", 40000.0, 5400, "2024-03-15T12:00:00Z"),
            common::activity_json("Run", 5000.0, 1500, "2024-03-16T18:00:00Z"),
        ]),
        1,
    )
    .await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Mi);
    let records = fetcher
        .fetch_activities("tok", AFTER, Some("Run"))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date_key(), "2024-03-15");
    assert_eq!(records[0].distance, 6.21);
    assert_eq!(records[0].pace, "8:03");
    assert_eq!(records[0].duration, "50:00");
    assert_eq!(records[0].name, "Run on 2024-03-15");
    assert_eq!(records[1].date_key(), "2024-03-16");
    assert_eq!(records[1].distance, 3.11);
}

#[tokio::test]
async fn test_no_type_filter_keeps_everything() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "1",
        json!([
            common::activity_json("Run", 10000.0, 3000, "2024-03-15T07:30:00Z"),
            common::activity_json("Ride", 40000.0, 5400, "2024-03-15T12:00:00Z"),
        ]),
        1,
    )
    .await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Km);
    let records = fetcher.fetch_activities("tok", AFTER, None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].distance, 40.0);
    assert_eq!(records[1].pace, "2:15");
    assert_eq!(records[1].duration, "1:30:00");
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Mi);
    let err = fetcher
        .fetch_activities("tok", AFTER, Some("Run"))
        .await
        .unwrap_err();

    match err {
        AppError::Fetch(msg) => assert!(msg.contains("500"), "unexpected message: {msg}"),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_on_later_page_discards_everything() {
    let server = MockServer::start().await;
    mount_page(&server, "1", common::runs(50), 1).await;
    Mock::given(method("GET"))
        .and(path("/api/v3/athlete/activities"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate Limit Exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ActivityFetcher::new(common::strava_client(&server), DistanceUnit::Mi);
    let result = fetcher.fetch_activities("tok", AFTER, Some("Run")).await;

    assert!(matches!(result, Err(AppError::Fetch(_))));
}
