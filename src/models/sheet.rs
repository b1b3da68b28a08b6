// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sheet-side models: column mapping, cell writes and the run summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

/// Which worksheet columns hold what. Columns are 1-based (A = 1).
///
/// An absent optional column means "leave that field alone".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_write_columns"))]
pub struct ColumnMapping {
    #[serde(default = "default_sheet_name")]
    #[validate(length(min = 1))]
    pub sheet_name: String,
    #[validate(range(min = 1))]
    pub date_column: u32,
    #[validate(range(min = 1))]
    pub distance_column: u32,
    #[validate(range(min = 1))]
    pub pace_column: u32,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub duration_column: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub notes_column: Option<u32>,
}

impl ColumnMapping {
    /// Columns the reconciler may write to.
    pub fn write_columns(&self) -> Vec<u32> {
        let mut cols = vec![self.distance_column, self.pace_column];
        cols.extend(self.duration_column);
        cols.extend(self.notes_column);
        cols
    }
}

/// The date column is the join key and must never be overwritten.
fn validate_write_columns(mapping: &ColumnMapping) -> Result<(), ValidationError> {
    if mapping.write_columns().contains(&mapping.date_column) {
        let mut err = ValidationError::new("date_column_overlap");
        err.message = Some("date_column must not also be a write column".into());
        return Err(err);
    }
    Ok(())
}

/// Value written into a single cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// One cell of a batch write. Row and column are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub row: u32,
    pub column: u32,
    pub value: CellValue,
}

impl CellWrite {
    pub fn number(row: u32, column: u32, value: f64) -> Self {
        Self {
            row,
            column,
            value: CellValue::Number(value),
        }
    }

    pub fn text(row: u32, column: u32, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            value: CellValue::Text(value.into()),
        }
    }
}

/// Per-run report handed to the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSummary {
    /// Records fetched after filtering
    pub fetched: usize,
    /// Rows written
    pub updated: usize,
    /// Record dates with no matching sheet row, in processing order
    pub unmatched_dates: Vec<NaiveDate>,
}
