// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava to Google Sheets sync
//!
//! Pulls recent Strava activities and writes distance, pace and duration
//! into the rows of a training-log spreadsheet whose date matches.

pub mod cli;
pub mod config;
pub mod date_format;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
