// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity retrieval and normalization.
//!
//! Handles the fetch half of a sync:
//! 1. Page through `/athlete/activities` until a short or empty page
//! 2. Keep only the configured activity type
//! 3. Convert each raw activity into an [`ActivityRecord`]

use crate::error::{AppError, Result};
use crate::models::{ActivityRecord, DistanceUnit, RawActivity};
use crate::services::StravaClient;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Activities requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Fetches activities and normalizes them for the sheet.
pub struct ActivityFetcher {
    client: StravaClient,
    unit: DistanceUnit,
}

impl ActivityFetcher {
    pub fn new(client: StravaClient, unit: DistanceUnit) -> Self {
        Self { client, unit }
    }

    /// Fetch, filter and normalize every activity started after `after`.
    ///
    /// An empty result is not an error.
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        after: i64,
        activity_type: Option<&str>,
    ) -> Result<Vec<ActivityRecord>> {
        let raw = self.fetch_all(access_token, after).await?;
        let total = raw.len();
        let kept = filter_by_type(raw, activity_type);

        tracing::info!(
            total,
            kept = kept.len(),
            activity_type = activity_type.unwrap_or("<any>"),
            "Fetched activities"
        );

        kept.iter()
            .map(|activity| parse_activity(activity, self.unit))
            .collect()
    }

    /// Retrieve every page of raw activities.
    ///
    /// Stops after the first page holding fewer than [`PAGE_SIZE`] items.
    pub async fn fetch_all(&self, access_token: &str, after: i64) -> Result<Vec<RawActivity>> {
        let mut activities = Vec::new();
        let mut page = 1u32;

        loop {
            let batch = self
                .client
                .list_activities(access_token, after, page, PAGE_SIZE)
                .await?;
            let batch_len = batch.len();
            tracing::debug!(page, count = batch_len, "Fetched activity page");

            activities.extend(batch);
            if batch_len < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(activities)
    }
}

/// Keep activities whose type tag equals `activity_type`; `None` keeps all.
pub fn filter_by_type(activities: Vec<RawActivity>, activity_type: Option<&str>) -> Vec<RawActivity> {
    match activity_type {
        Some(wanted) => activities
            .into_iter()
            .filter(|a| a.activity_type == wanted)
            .collect(),
        None => activities,
    }
}

/// Convert a raw Strava activity into a canonical record.
pub fn parse_activity(activity: &RawActivity, unit: DistanceUnit) -> Result<ActivityRecord> {
    let distance = round_2dp(activity.distance / unit.meters());
    let name = activity.name.clone().unwrap_or_default();

    let start = activity
        .start_date_local
        .as_deref()
        .or(activity.start_date.as_deref())
        .ok_or_else(|| AppError::Fetch(format!("Activity '{}' has no start date", name)))?;
    let date = parse_start_date(start).ok_or_else(|| {
        AppError::Fetch(format!("Activity '{}' has invalid start date: {}", name, start))
    })?;

    Ok(ActivityRecord {
        date,
        distance,
        unit,
        pace: format_pace(activity.moving_time, distance),
        duration: format_duration(activity.moving_time),
        name,
    })
}

/// Pace per unit as `M:SS`, truncated to whole seconds.
pub fn format_pace(moving_time_secs: u64, distance: f64) -> String {
    if distance == 0.0 {
        return "N/A".to_string();
    }
    let per_unit = moving_time_secs as f64 / distance;
    let minutes = (per_unit / 60.0).floor() as u64;
    let seconds = (per_unit % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}

/// Moving time as `H:MM:SS`, or `M:SS` under an hour.
pub fn format_duration(moving_time_secs: u64) -> String {
    let hours = moving_time_secs / 3600;
    let minutes = (moving_time_secs % 3600) / 60;
    let seconds = moving_time_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Round to 2 decimal places from the exact binary value, ties to even.
fn round_2dp(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Calendar date of a Strava timestamp, as written (no zone conversion).
fn parse_start_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(distance: f64, moving_time: u64) -> RawActivity {
        RawActivity {
            distance,
            moving_time,
            activity_type: "Run".to_string(),
            start_date_local: Some("2024-03-15T07:00:00Z".to_string()),
            start_date: Some("2024-03-15T14:00:00Z".to_string()),
            name: Some("Morning Run".to_string()),
        }
    }

    #[test]
    fn test_parse_morning_run_in_miles() {
        let record = parse_activity(&raw(10000.0, 3000), DistanceUnit::Mi).unwrap();
        assert_eq!(record.distance, 6.21);
        assert_eq!(record.pace, "8:03");
        assert_eq!(record.duration, "50:00");
        assert_eq!(record.date_key(), "2024-03-15");
        assert_eq!(record.name, "Morning Run");
        assert_eq!(record.unit, DistanceUnit::Mi);
    }

    #[test]
    fn test_parse_in_kilometers() {
        let record = parse_activity(&raw(10000.0, 3000), DistanceUnit::Km).unwrap();
        assert_eq!(record.distance, 10.0);
        assert_eq!(record.pace, "5:00");
    }

    #[test]
    fn test_zero_distance_pace_is_na() {
        let record = parse_activity(&raw(0.0, 1200), DistanceUnit::Mi).unwrap();
        assert_eq!(record.pace, "N/A");
        assert_eq!(record.duration, "20:00");
    }

    #[test]
    fn test_distance_rounding_to_zero_is_na() {
        // 3 m is 0.00 mi after rounding
        let record = parse_activity(&raw(3.0, 60), DistanceUnit::Mi).unwrap();
        assert_eq!(record.distance, 0.0);
        assert_eq!(record.pace, "N/A");
    }

    #[test]
    fn test_distance_rounds_stored_value_half_even() {
        let km = |meters: f64| parse_activity(&raw(meters, 1500), DistanceUnit::Km).unwrap();

        // 5.005 is stored just below the tie
        assert_eq!(km(5005.0).distance, 5.0);
        // Exact binary ties go to the even digit
        assert_eq!(km(10125.0).distance, 10.12);
        assert_eq!(km(125.0).distance, 0.12);
        assert_eq!(km(15.0).distance, 0.01);
        assert_eq!(km(10135.0).distance, 10.13);

        // Pace follows the rounded distance
        assert_eq!(km(5005.0).pace, "5:00");
    }

    #[test]
    fn test_duration_formats() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
        assert_eq!(format_duration(36000 + 5), "10:00:05");
    }

    #[test]
    fn test_duration_hour_segment_only_past_an_hour() {
        for t in (1..20_000u64).step_by(97) {
            let segments = format_duration(t).split(':').count();
            if t < 3600 {
                assert_eq!(segments, 2, "t={}", t);
            } else {
                assert_eq!(segments, 3, "t={}", t);
            }
        }
    }

    #[test]
    fn test_pace_seconds_always_in_range() {
        for meters in [10.0, 400.0, 1609.344, 5000.0, 21097.5, 42195.0] {
            for t in [1u64, 59, 60, 61, 299, 1800, 3601, 14_400] {
                let distance = round_2dp(meters / 1000.0);
                let pace = format_pace(t, distance);
                let (min, sec_str) = pace.split_once(':').unwrap();
                assert!(min.parse::<u64>().is_ok(), "pace={}", pace);
                assert_eq!(sec_str.len(), 2, "pace={}", pace);
                let sec: u64 = sec_str.parse().unwrap();
                assert!(sec <= 59, "pace={}", pace);
            }
        }
    }

    #[test]
    fn test_pace_zero_pads_seconds() {
        assert_eq!(format_pace(1205, 2.0), "10:02");
    }

    #[test]
    fn test_date_falls_back_to_utc_start() {
        let mut activity = raw(5000.0, 1500);
        activity.start_date_local = None;
        activity.start_date = Some("2024-03-16T01:30:00Z".to_string());
        let record = parse_activity(&activity, DistanceUnit::Km).unwrap();
        assert_eq!(record.date_key(), "2024-03-16");
    }

    #[test]
    fn test_date_keeps_local_calendar_day() {
        assert_eq!(
            parse_start_date("2024-03-15T23:30:00-08:00"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(
            parse_start_date("2024-03-15T23:30:00"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
    }

    #[test]
    fn test_missing_start_date_is_error() {
        let mut activity = raw(5000.0, 1500);
        activity.start_date_local = None;
        activity.start_date = None;
        assert!(matches!(
            parse_activity(&activity, DistanceUnit::Km),
            Err(AppError::Fetch(_))
        ));
    }

    #[test]
    fn test_filter_by_type() {
        let mut ride = raw(20000.0, 3600);
        ride.activity_type = "Ride".to_string();
        let all = vec![raw(5000.0, 1500), ride, raw(8000.0, 2400)];

        assert_eq!(filter_by_type(all.clone(), Some("Run")).len(), 2);
        assert_eq!(filter_by_type(all.clone(), Some("Ride")).len(), 1);
        assert_eq!(filter_by_type(all.clone(), Some("Swim")).len(), 0);
        assert_eq!(filter_by_type(all, None).len(), 3);
    }

    #[test]
    fn test_missing_name_is_empty() {
        let mut activity = raw(5000.0, 1500);
        activity.name = None;
        let record = parse_activity(&activity, DistanceUnit::Km).unwrap();
        assert_eq!(record.name, "");
    }
}
