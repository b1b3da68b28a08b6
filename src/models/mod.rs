// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the sync engine.

pub mod activity;
pub mod credential;
pub mod sheet;

pub use activity::{ActivityRecord, DistanceUnit, RawActivity};
pub use credential::Credential;
pub use sheet::{CellValue, CellWrite, ColumnMapping, SyncSummary};
