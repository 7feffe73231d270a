// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./renewbot.toml` > `~/.config/renewbot/renewbot.toml` > `/etc/renewbot/renewbot.toml`
//! with environment variable overrides via `RENEWBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RenewbotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/renewbot/renewbot.toml` (system-wide)
/// 3. `~/.config/renewbot/renewbot.toml` (user XDG config)
/// 4. `./renewbot.toml` (local directory)
/// 5. `RENEWBOT_*` environment variables
pub fn load_config() -> Result<RenewbotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RenewbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RenewbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RenewbotConfig, figment::Error> {
    tracing::debug!(path = %path.display(), "loading config from explicit path");
    Figment::new()
        .merge(Serialized::defaults(RenewbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RenewbotConfig::default()))
        .merge(Toml::file("/etc/renewbot/renewbot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("renewbot/renewbot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("renewbot.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `RENEWBOT_TELEGRAM_BOT_TOKEN` must map to `telegram.bot_token`,
/// not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("RENEWBOT_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to its dotted config path.
fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &["bot", "telegram", "sheets", "schedule", "whitelist"];

    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
