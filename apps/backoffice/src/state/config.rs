//! # Configuration
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SIMPLY_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use simply_core::formatters::{utc_offset, DEFAULT_UTC_OFFSET_MINUTES};
use simply_core::report::ReportPeriod;
use tracing::warn;

pub const DEFAULT_STORE_NAME: &str = "SIMPLY COSMÉTICOS";

/// How long the till keeps a completed sale on screen.
pub const DEFAULT_TILL_RESET_DELAY_MS: u64 = 3000;

const DB_FILE_NAME: &str = "simply.db";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Printed on receipts and report headers.
    pub store_name: String,

    /// Local time offset in minutes east of UTC (Brasília is -180).
    pub utc_offset_minutes: i32,

    pub till_reset_delay_ms: u64,

    /// Dashboard report period.
    pub report_period_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            store_name: DEFAULT_STORE_NAME.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            till_reset_delay_ms: DEFAULT_TILL_RESET_DELAY_MS,
            report_period_days: ReportPeriod::default().days,
        }
    }
}

impl AppConfig {
    /// Creates the configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `SIMPLY_DB_PATH`: database file
    /// - `SIMPLY_STORE_NAME`: store name
    /// - `SIMPLY_UTC_OFFSET_MINUTES`: e.g. `-180`
    /// - `SIMPLY_TILL_RESET_DELAY_MS`: e.g. `3000`
    /// - `SIMPLY_REPORT_PERIOD_DAYS`: e.g. `30`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary source.
    /// Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = AppConfig::default();

        if let Some(path) = lookup("SIMPLY_DB_PATH").filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(name) = lookup("SIMPLY_STORE_NAME").filter(|n| !n.trim().is_empty()) {
            config.store_name = name;
        }

        if let Some(minutes) = parse_var(&lookup, "SIMPLY_UTC_OFFSET_MINUTES") {
            config.utc_offset_minutes = minutes;
        }

        if let Some(delay) = parse_var(&lookup, "SIMPLY_TILL_RESET_DELAY_MS") {
            config.till_reset_delay_ms = delay;
        }

        if let Some(days) = parse_var::<i64>(&lookup, "SIMPLY_REPORT_PERIOD_DAYS") {
            match ReportPeriod::new(days) {
                Ok(period) => config.report_period_days = period.days,
                Err(e) => warn!(days, error = %e, "Ignoring SIMPLY_REPORT_PERIOD_DAYS"),
            }
        }

        config
    }

    pub fn utc_offset(&self) -> FixedOffset {
        utc_offset(self.utc_offset_minutes)
    }

    pub fn till_reset_delay(&self) -> Duration {
        Duration::from_millis(self.till_reset_delay_ms)
    }

    pub fn report_period(&self) -> ReportPeriod {
        ReportPeriod::new(self.report_period_days).unwrap_or_default()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

/// Platform data directory, falling back to the working directory.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.simply.cosmeticos/simply.db`
/// - **Windows**: `%APPDATA%\simply\cosmeticos\data\simply.db`
/// - **Linux**: `~/.local/share/cosmeticos/simply.db`
fn default_database_path() -> PathBuf {
    match ProjectDirs::from("com", "simply", "cosmeticos") {
        Some(dirs) => dirs.data_dir().join(DB_FILE_NAME),
        None => PathBuf::from(DB_FILE_NAME),
    }
}
