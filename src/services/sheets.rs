// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tabular store access: the Google Sheets worksheet and an in-memory fake.

use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use crate::models::{CellValue, CellWrite};
use crate::services::google_auth::{self, ServiceAccountKey, SHEETS_SCOPES};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A single named worksheet that can be read by column and written in batches.
#[allow(async_fn_in_trait)]
pub trait TabularStore {
    /// Every cell of a 1-based column, top to bottom. Trailing empty cells
    /// may be omitted.
    async fn read_column(&self, column: u32) -> Result<Vec<String>>;

    /// Write all cells in one request.
    async fn write_cells(&self, cells: &[CellWrite]) -> Result<()>;
}

/// A worksheet inside a Google Sheets document.
#[derive(Clone)]
pub struct GoogleSheet {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    access_token: String,
}

impl GoogleSheet {
    /// Authenticate with the service account and open `sheet_name`.
    pub async fn connect(google: &GoogleConfig, sheet_name: &str) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&google.service_account_json)?;
        let access_token = google_auth::fetch_access_token(&key, SHEETS_SCOPES).await?;

        tracing::info!(
            spreadsheet_id = %google.spreadsheet_id,
            sheet = sheet_name,
            "Connected to Google Sheets"
        );

        Ok(Self::new(
            SHEETS_API_BASE,
            &google.spreadsheet_id,
            sheet_name,
            access_token,
        ))
    }

    /// Open a worksheet with an already obtained bearer token.
    pub fn new(
        base_url: &str,
        spreadsheet_id: &str,
        sheet_name: &str,
        access_token: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn spreadsheet_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id)
        )
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Store(format!("HTTP {}: {}", status, body)))
    }
}

/// Request body for `values:batchUpdate`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<ValueRangeWrite>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeWrite {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<CellValue>>,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl TabularStore for GoogleSheet {
    async fn read_column(&self, column: u32) -> Result<Vec<String>> {
        let letter = column_letter(column);
        let range = format!("{}!{}:{}", quote_sheet_name(&self.sheet_name), letter, letter);
        let url = format!(
            "{}/values/{}",
            self.spreadsheet_url(),
            urlencoding::encode(&range)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("majorDimension", "COLUMNS"),
                ("valueRenderOption", "FORMATTED_VALUE"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Column read failed: {}", e)))?;

        let body: ValueRange = Self::check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Store(format!("JSON parse error: {}", e)))?;

        let cells = body
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(cell_text)
            .collect::<Vec<_>>();

        tracing::debug!(range = %range, rows = cells.len(), "Read sheet column");
        Ok(cells)
    }

    async fn write_cells(&self, cells: &[CellWrite]) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }

        let request = BatchUpdateRequest {
            value_input_option: "USER_ENTERED",
            data: cells
                .iter()
                .map(|cell| ValueRangeWrite {
                    range: a1_cell(&self.sheet_name, cell.row, cell.column),
                    major_dimension: "ROWS",
                    values: vec![vec![cell.value.clone()]],
                })
                .collect(),
        };

        let response = self
            .http
            .post(format!("{}/values:batchUpdate", self.spreadsheet_url()))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Batch update failed: {}", e)))?;

        Self::check_response(response).await?;
        Ok(())
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Spreadsheet column letters for a 1-based index (1 = A, 27 = AA).
pub fn column_letter(column: u32) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quote a sheet name for A1 notation.
fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// A1 reference for a single cell, e.g. `'Sheet1'!E12`.
pub fn a1_cell(sheet_name: &str, row: u32, column: u32) -> String {
    format!("{}!{}{}", quote_sheet_name(sheet_name), column_letter(column), row)
}

// ─────────────────────────────────────────────────────────────────────────────
// MemorySheet - offline worksheet
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemorySheetState {
    cells: HashMap<(u32, u32), CellValue>,
    batches: Vec<Vec<CellWrite>>,
    column_reads: usize,
    fail_writes_after: Option<usize>,
}

/// In-memory worksheet for tests and offline runs.
#[derive(Default)]
pub struct MemorySheet {
    state: Mutex<MemorySheetState>,
}

impl MemorySheet {
    pub fn new_mock() -> Self {
        Self::default()
    }

    /// Fill a column from row 1 downward with text values.
    pub fn with_column(self, column: u32, values: &[&str]) -> Self {
        {
            let mut state = self.lock();
            for (i, value) in values.iter().enumerate() {
                state
                    .cells
                    .insert((i as u32 + 1, column), CellValue::Text(value.to_string()));
            }
        }
        self
    }

    /// Reject every batch once `batches` writes have succeeded.
    pub fn fail_writes_after(self, batches: usize) -> Self {
        self.lock().fail_writes_after = Some(batches);
        self
    }

    /// Current value of a cell.
    pub fn cell(&self, row: u32, column: u32) -> Option<CellValue> {
        self.lock().cells.get(&(row, column)).cloned()
    }

    /// Every batch written so far, in order.
    pub fn batches(&self) -> Vec<Vec<CellWrite>> {
        self.lock().batches.clone()
    }

    pub fn column_reads(&self) -> usize {
        self.lock().column_reads
    }

    fn lock(&self) -> MutexGuard<'_, MemorySheetState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TabularStore for MemorySheet {
    async fn read_column(&self, column: u32) -> Result<Vec<String>> {
        let mut state = self.lock();
        state.column_reads += 1;

        let last_row = state
            .cells
            .keys()
            .filter(|(_, col)| *col == column)
            .map(|(row, _)| *row)
            .max()
            .unwrap_or(0);

        Ok((1..=last_row)
            .map(|row| match state.cells.get(&(row, column)) {
                Some(CellValue::Text(s)) => s.clone(),
                Some(CellValue::Number(n)) => n.to_string(),
                None => String::new(),
            })
            .collect())
    }

    async fn write_cells(&self, cells: &[CellWrite]) -> Result<()> {
        let mut state = self.lock();
        if state
            .fail_writes_after
            .is_some_and(|limit| state.batches.len() >= limit)
        {
            return Err(AppError::Store("write rejected".to_string()));
        }
        for cell in cells {
            state
                .cells
                .insert((cell.row, cell.column), cell.value.clone());
        }
        state.batches.push(cells.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(5), "E");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_a1_cell_quotes_sheet_name() {
        assert_eq!(a1_cell("Sheet1", 12, 5), "'Sheet1'!E12");
        assert_eq!(a1_cell("Marathon Plan", 3, 1), "'Marathon Plan'!A3");
        assert_eq!(a1_cell("Bob's Runs", 1, 2), "'Bob''s Runs'!B1");
    }

    #[test]
    fn test_cell_text_conversion() {
        assert_eq!(cell_text(serde_json::json!("3/15/2024")), "3/15/2024");
        assert_eq!(cell_text(serde_json::json!(45366)), "45366");
        assert_eq!(cell_text(serde_json::Value::Null), "");
    }

    #[tokio::test]
    async fn test_memory_sheet_read_pads_gaps() {
        let sheet = MemorySheet::new_mock().with_column(1, &["Date", "", "3/15/2024"]);
        let column = sheet.read_column(1).await.unwrap();
        assert_eq!(column, vec!["Date", "", "3/15/2024"]);
        assert!(sheet.read_column(2).await.unwrap().is_empty());
        assert_eq!(sheet.column_reads(), 2);
    }

    #[tokio::test]
    async fn test_memory_sheet_records_batches() {
        let sheet = MemorySheet::new_mock();
        sheet
            .write_cells(&[CellWrite::number(2, 5, 6.21), CellWrite::text(2, 6, "8:03")])
            .await
            .unwrap();
        assert_eq!(sheet.batches().len(), 1);
        assert_eq!(sheet.cell(2, 5), Some(CellValue::Number(6.21)));
        assert_eq!(sheet.cell(2, 6), Some(CellValue::Text("8:03".into())));
    }
}
