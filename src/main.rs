// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava → Google Sheets sync
//!
//! Fetches recent Strava activities and writes distance and pace into the
//! matching date rows of a training spreadsheet.

use chrono::Utc;
use clap::Parser;
use std::process::ExitCode;
use strava_sheets_sync::{
    cli::Cli,
    config::Config,
    db::ConfigFileCredentialStore,
    error::Result,
    models::{ActivityRecord, SyncSummary},
    routes::run_consent_flow,
    services::{sync::lookback_start, GoogleSheet, StravaClient, SyncService, TokenManager},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Sync failed");
            eprintln!("ERROR: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_path(cli.config);
    let config = Config::load(&config_path)?;
    let credential_store = ConfigFileCredentialStore::new(&config_path);
    let client = StravaClient::new();

    if cli.auth {
        let tokens = TokenManager::new(client, credential_store);
        run_consent_flow(&tokens, &config.strava).await?;
        println!(
            "Strava authorization complete. Tokens saved to {}.",
            config_path.display()
        );
        return Ok(());
    }

    if cli.dry_run {
        config.check_authorized()?;
    } else {
        config.check_sync_ready()?;
    }

    let mut credential = config.strava.clone();
    let sync = SyncService::new(&config, client, credential_store);
    let after = lookback_start(Utc::now(), cli.days)?;

    println!(
        "\nFetching Strava {} activities from the last {} day(s)...",
        config.activity_type.as_deref().unwrap_or("(all)"),
        cli.days
    );
    let records = sync.fetch_records(&mut credential, after).await?;

    if records.is_empty() {
        println!("   No activities found in that time range.");
        return Ok(());
    }

    print_records(&records);

    if cli.dry_run {
        println!("\n   (Dry run - no data written to Google Sheets)");
        return Ok(());
    }

    println!("\nWriting to Google Sheets...");
    let sheet = GoogleSheet::connect(&config.google, &config.sheet_mapping.sheet_name).await?;
    let summary = sync.write_records(&records, &sheet).await?;
    print_summary(&summary);
    Ok(())
}

fn print_records(records: &[ActivityRecord]) {
    println!("   Found {} activit(ies):\n", records.len());
    for r in records {
        println!(
            "   {}  |  {} {}  |  {}  |  {}  |  {}",
            r.date_key(),
            r.distance,
            r.unit,
            r.pace,
            r.duration,
            r.name
        );
    }
}

fn print_summary(summary: &SyncSummary) {
    println!("\nDone! Updated {} row(s).", summary.updated);
    if !summary.unmatched_dates.is_empty() {
        let dates: Vec<String> = summary
            .unmatched_dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        println!(
            "   Could not find matching date rows for: {}",
            dates.join(", ")
        );
        println!("   (Make sure those dates exist in your sheet's date column.)");
    }
}

/// Initialize logging on stderr; `LOG_FORMAT=json` switches to structured JSON.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("strava_sheets_sync=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
