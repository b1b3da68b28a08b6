// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity models: the raw API shape and the canonical record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary activity as returned by `GET /athlete/activities`.
///
/// Only the fields the sync needs are decoded; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawActivity {
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Activity type tag (Run, Ride, Walk, ...)
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// Start time in the athlete's local zone (ISO 8601)
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Start time in UTC (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Activity name/title
    #[serde(default)]
    pub name: Option<String>,
}

/// Distance unit written to the sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "miles", alias = "mi")]
    Mi,
    #[serde(rename = "km", alias = "kilometers")]
    Km,
}

impl DistanceUnit {
    /// Meters in one unit.
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Mi => 1609.344,
            DistanceUnit::Km => 1000.0,
        }
    }

    /// Short label shown next to distances.
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Mi => "mi",
            DistanceUnit::Km => "km",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical activity record, the unit of reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRecord {
    /// Calendar date of the activity start (join key)
    pub date: NaiveDate,
    /// Distance in `unit`, rounded to 2 decimals
    pub distance: f64,
    pub unit: DistanceUnit,
    /// Pace per unit as `M:SS`, or `N/A`
    pub pace: String,
    /// Moving time as `H:MM:SS` or `M:SS`
    pub duration: String,
    pub name: String,
}

impl ActivityRecord {
    /// Canonical `YYYY-MM-DD` form of the date.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
