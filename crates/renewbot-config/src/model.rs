// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for renewbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level renewbot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional; `telegram.bot_token` and `sheets.spreadsheet_id`
/// are enforced by validation rather than by deserialization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RenewbotConfig {
    /// Process-level settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Google Sheets record store settings.
    #[serde(default)]
    pub sheets: SheetsConfig,

    /// Check interval and local time zone.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Whitelisted destination persistence.
    #[serde(default)]
    pub whitelist: WhitelistConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required to serve.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Google Sheets configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    /// Spreadsheet id from the sheet URL. Required to serve.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    /// Tab holding the account rows.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Path to the service-account JSON key.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Static OAuth bearer token. When set, `credentials_path` is not read.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Base URL of the Sheets API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: default_sheet_name(),
            credentials_path: default_credentials_path(),
            access_token: None,
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_sheet_name() -> String {
    "SLOT OFFICE TRIAL".to_string()
}

fn default_credentials_path() -> String {
    "./credentials/google_credentials.json".to_string()
}

fn default_api_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// Scheduler configuration.
///
/// Quiet hours (22:30-07:00) and the 07:00 daily summary are fixed; only the
/// periodic interval and the local offset are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Minutes between periodic checks.
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,

    /// Local time zone as minutes east of UTC.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_interval_minutes: default_check_interval_minutes(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

fn default_check_interval_minutes() -> u64 {
    15
}

fn default_utc_offset_minutes() -> i32 {
    7 * 60 // Asia/Bangkok, no DST
}

/// Whitelist persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhitelistConfig {
    /// JSON file holding `{"group_ids": [...]}`.
    #[serde(default = "default_whitelist_path")]
    pub path: String,
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        Self {
            path: default_whitelist_path(),
        }
    }
}

fn default_whitelist_path() -> String {
    "./data/whitelist.json".to_string()
}
