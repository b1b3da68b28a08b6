// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One sync run.
//!
//! Handles the core workflow:
//! 1. Get a valid Strava token (refreshing and saving if needed)
//! 2. Fetch, filter and normalize activities after the look-back start
//! 3. Sort records ascending by date
//! 4. Reconcile them against the sheet

use crate::config::{Config, ConfigError};
use crate::db::CredentialStore;
use crate::error::Result;
use crate::models::{ActivityRecord, Credential, SyncSummary};
use crate::services::sheets::TabularStore;
use crate::services::{ActivityFetcher, SheetReconciler, StravaClient, TokenManager};
use chrono::{DateTime, Duration, Utc};

/// Drives token → fetch → reconcile for one run.
pub struct SyncService<C> {
    tokens: TokenManager<C>,
    fetcher: ActivityFetcher,
    reconciler: SheetReconciler,
    activity_type: Option<String>,
}

impl<C: CredentialStore> SyncService<C> {
    pub fn new(config: &Config, client: StravaClient, credential_store: C) -> Self {
        Self {
            tokens: TokenManager::new(client.clone(), credential_store),
            fetcher: ActivityFetcher::new(client, config.units),
            reconciler: SheetReconciler::new(config.sheet_mapping.clone()),
            activity_type: config.activity_type.clone(),
        }
    }

    /// Fetch records started after `after`, sorted ascending by date.
    ///
    /// The sort is stable, so same-day activities keep Strava's order.
    pub async fn fetch_records(
        &self,
        credential: &mut Credential,
        after: i64,
    ) -> Result<Vec<ActivityRecord>> {
        let access_token = self.tokens.get_valid_access_token(credential).await?;
        let mut records = self
            .fetcher
            .fetch_activities(&access_token, after, self.activity_type.as_deref())
            .await?;
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    /// Write already fetched records into the sheet.
    pub async fn write_records<S: TabularStore>(
        &self,
        records: &[ActivityRecord],
        store: &S,
    ) -> Result<SyncSummary> {
        let outcome = self.reconciler.reconcile(records, store).await?;
        Ok(SyncSummary {
            fetched: records.len(),
            updated: outcome.updated,
            unmatched_dates: outcome.unmatched_dates,
        })
    }

    /// Full run against an open store.
    ///
    /// With no activities in range the store is never touched.
    pub async fn run<S: TabularStore>(
        &self,
        credential: &mut Credential,
        after: i64,
        store: &S,
    ) -> Result<SyncSummary> {
        let records = self.fetch_records(credential, after).await?;
        if records.is_empty() {
            tracing::info!("No activities found in range");
            return Ok(SyncSummary::default());
        }

        let summary = self.write_records(&records, store).await?;
        tracing::info!(
            fetched = summary.fetched,
            updated = summary.updated,
            unmatched = summary.unmatched_dates.len(),
            "Sync complete"
        );
        Ok(summary)
    }
}

/// Unix timestamp `days` days before `now`.
///
/// Fails when the window reaches past the earliest representable date.
pub fn lookback_start(now: DateTime<Utc>, days: u32) -> std::result::Result<i64, ConfigError> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .map(|start| start.timestamp())
        .ok_or_else(|| ConfigError::Invalid(format!("--days {} is too far in the past", days)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookback_start() {
        let now = DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(lookback_start(now, 0).unwrap(), now.timestamp());
        assert_eq!(lookback_start(now, 1).unwrap(), now.timestamp() - 86_400);
        assert_eq!(lookback_start(now, 7).unwrap(), now.timestamp() - 7 * 86_400);
    }

    #[test]
    fn test_lookback_out_of_range_is_config_error() {
        let now = Utc::now();
        assert!(matches!(
            lookback_start(now, 100_000_000),
            Err(ConfigError::Invalid(msg)) if msg.contains("100000000")
        ));
        assert!(lookback_start(now, u32::MAX).is_err());
    }
}
