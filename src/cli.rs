//! Command-line interface definition.

use std::path::PathBuf;

use clap::Parser;

use crate::config::CONFIG_PATH_ENV;

/// Sync Strava activities to a Google Sheets training log
#[derive(Debug, Parser)]
#[command(name = "strava-sheets-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run the one-time Strava OAuth setup
    #[arg(long)]
    pub auth: bool,

    /// Number of days to look back
    #[arg(long, default_value_t = 1)]
    pub days: u32,

    /// Fetch and display activities without writing to the sheet
    #[arg(long)]
    pub dry_run: bool,

    /// Path to the JSON configuration file
    #[arg(long, short, env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["strava-sheets-sync"]).unwrap();
        assert!(!cli.auth);
        assert!(!cli.dry_run);
        assert_eq!(cli.days, 1);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "strava-sheets-sync",
            "--days",
            "7",
            "--dry-run",
            "--config",
            "/tmp/c.json",
        ])
        .unwrap();
        assert_eq!(cli.days, 7);
        assert!(cli.dry_run);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn test_negative_days_rejected() {
        assert!(Cli::try_parse_from(["strava-sheets-sync", "--days", "-1"]).is_err());
    }
}
