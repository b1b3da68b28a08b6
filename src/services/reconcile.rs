// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Date-keyed reconciliation of activity records against sheet rows.

use crate::date_format::normalize_date;
use crate::error::Result;
use crate::models::{ActivityRecord, CellWrite, ColumnMapping};
use crate::services::sheets::TabularStore;
use chrono::NaiveDate;

/// Result of reconciling one batch of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    /// Rows written
    pub updated: usize,
    /// Record dates with no matching row, in processing order
    pub unmatched_dates: Vec<NaiveDate>,
}

/// Writes activity records into the rows whose date matches.
pub struct SheetReconciler {
    mapping: ColumnMapping,
}

impl SheetReconciler {
    pub fn new(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    /// Write each record into its matching row.
    ///
    /// Records are processed in the order given; callers sort ascending by
    /// date so the latest activity of a day is written last. Each matched
    /// record is one batch write. A record with no matching row is reported,
    /// not treated as an error.
    pub async fn reconcile<S: TabularStore>(
        &self,
        records: &[ActivityRecord],
        store: &S,
    ) -> Result<ReconcileOutcome> {
        let mut outcome = ReconcileOutcome::default();
        if records.is_empty() {
            return Ok(outcome);
        }

        // The date column is never a write target, so one scan serves every record
        let dates = normalize_column(&store.read_column(self.mapping.date_column).await?);

        for record in records {
            let key = record.date_key();
            let Some(row) = find_date_row(&dates, &key) else {
                tracing::warn!(date = %key, "No sheet row for activity date");
                outcome.unmatched_dates.push(record.date);
                continue;
            };

            store.write_cells(&self.cell_writes(record, row)).await?;
            outcome.updated += 1;

            tracing::info!(
                date = %key,
                row,
                distance = record.distance,
                pace = %record.pace,
                "Sheet row updated"
            );
        }

        Ok(outcome)
    }

    /// Cells written for a record matched to `row`.
    ///
    /// Optional columns that are not mapped are left alone; the name is only
    /// written when it is non-empty.
    pub fn cell_writes(&self, record: &ActivityRecord, row: u32) -> Vec<CellWrite> {
        let mut cells = vec![
            CellWrite::number(row, self.mapping.distance_column, record.distance),
            CellWrite::text(row, self.mapping.pace_column, record.pace.as_str()),
        ];
        if let Some(col) = self.mapping.duration_column {
            cells.push(CellWrite::text(row, col, record.duration.as_str()));
        }
        if let Some(col) = self.mapping.notes_column {
            if !record.name.is_empty() {
                cells.push(CellWrite::text(row, col, record.name.as_str()));
            }
        }
        cells
    }
}

/// Normalize a date column; empty cells become `None`.
fn normalize_column(cells: &[String]) -> Vec<Option<String>> {
    cells
        .iter()
        .map(|cell| {
            if cell.trim().is_empty() {
                None
            } else {
                Some(normalize_date(cell))
            }
        })
        .collect()
}

/// First 1-based row whose normalized date equals `date`.
fn find_date_row(normalized: &[Option<String>], date: &str) -> Option<u32> {
    normalized
        .iter()
        .position(|cell| cell.as_deref() == Some(date))
        .map(|index| index as u32 + 1)
}
