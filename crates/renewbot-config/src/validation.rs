// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: required credentials,
//! positive intervals, and an offset chrono will accept.

use crate::diagnostic::ConfigError;
use crate::model::RenewbotConfig;

/// Largest accepted UTC offset, in minutes (UTC+14:00 / UTC-14:00).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &RenewbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if is_blank(config.telegram.bot_token.as_deref()) {
        fail("telegram.bot_token must be set (RENEWBOT_TELEGRAM_BOT_TOKEN)".to_string());
    }

    if is_blank(config.sheets.spreadsheet_id.as_deref()) {
        fail("sheets.spreadsheet_id must be set (RENEWBOT_SHEETS_SPREADSHEET_ID)".to_string());
    }

    if config.sheets.sheet_name.trim().is_empty() {
        fail("sheets.sheet_name must not be empty".to_string());
    }

    if config.sheets.access_token.is_none() && config.sheets.credentials_path.trim().is_empty() {
        fail("sheets.credentials_path must not be empty when sheets.access_token is unset".to_string());
    }

    if !config.sheets.api_base_url.starts_with("http://")
        && !config.sheets.api_base_url.starts_with("https://")
    {
        fail(format!(
            "sheets.api_base_url `{}` must be an http(s) URL",
            config.sheets.api_base_url
        ));
    }

    if config.schedule.check_interval_minutes == 0 {
        fail("schedule.check_interval_minutes must be at least 1".to_string());
    }

    if config.schedule.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        fail(format!(
            "schedule.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
            config.schedule.utc_offset_minutes
        ));
    }

    if config.whitelist.path.trim().is_empty() {
        fail("whitelist.path must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        fail(format!(
            "bot.log_level `{}` must be one of {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> RenewbotConfig {
        let mut config = RenewbotConfig::default();
        config.telegram.bot_token = Some("123:ABC".to_string());
        config.sheets.spreadsheet_id = Some("sheet-id".to_string());
        config
    }

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn complete_config_validates() {
        assert!(validate_config(&complete_config()).is_ok());
    }

    #[test]
    fn defaults_lack_required_credentials() {
        let errors = validate_config(&RenewbotConfig::default()).unwrap_err();
        assert!(has_error(&errors, "telegram.bot_token"));
        assert!(has_error(&errors, "sheets.spreadsheet_id"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn blank_token_fails_validation() {
        let mut config = complete_config();
        config.telegram.bot_token = Some("   ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "telegram.bot_token"));
    }

    #[test]
    fn zero_interval_fails_validation() {
        let mut config = complete_config();
        config.schedule.check_interval_minutes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "check_interval_minutes"));
    }

    #[test]
    fn out_of_range_offset_fails_validation() {
        let mut config = complete_config();
        config.schedule.utc_offset_minutes = -15 * 60;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "utc_offset_minutes"));
    }

    #[test]
    fn access_token_makes_credentials_path_optional() {
        let mut config = complete_config();
        config.sheets.credentials_path = String::new();
        assert!(validate_config(&config).is_err());

        config.sheets.access_token = Some("ya29.token".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = complete_config();
        config.bot.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "bot.log_level"));
    }

    #[test]
    fn partial_toml_fills_defaults_then_validates() {
        let toml_str = r#"
[telegram]
bot_token = "123:ABC"

[sheets]
spreadsheet_id = "sheet-id"

[schedule]
check_interval_minutes = 5
"#;
        let config: RenewbotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.schedule.check_interval_minutes, 5);
        assert_eq!(config.schedule.utc_offset_minutes, 420);
        assert_eq!(config.sheets.sheet_name, "SLOT OFFICE TRIAL");
        assert_eq!(config.whitelist.path, "./data/whitelist.json");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_section_key_is_rejected_by_toml() {
        let toml_str = r#"
[schedule]
check_interval = 5
"#;
        let result = toml::from_str::<RenewbotConfig>(toml_str);
        assert!(result.is_err(), "deny_unknown_fields should reject typo keys");
    }
}
