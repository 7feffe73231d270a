// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `renewbot check` and `renewbot summary`: print what the bot would send
//! without connecting to Telegram.

use renewbot_alerts::AlertEngine;
use renewbot_config::RenewbotConfig;
use renewbot_core::error::RenewError;
use renewbot_cron::is_quiet_hours;

use crate::serve::{build_clock, build_store};

async fn build_engine(config: &RenewbotConfig) -> Result<AlertEngine, RenewError> {
    let clock = build_clock(config)?;
    let store = build_store(config).await?;
    Ok(AlertEngine::new(store, clock))
}

/// Runs the `renewbot check` command.
pub async fn run_check(config: &RenewbotConfig) -> Result<(), RenewError> {
    let engine = build_engine(config).await?;
    print!("{}", render_check(&engine).await);
    Ok(())
}

/// Runs the `renewbot summary` command.
pub async fn run_summary(config: &RenewbotConfig) -> Result<(), RenewError> {
    let engine = build_engine(config).await?;
    let alerts = engine.scan_daily_summary().await;
    println!("{}", engine.format_daily_summary(&alerts));
    Ok(())
}

async fn render_check(engine: &AlertEngine) -> String {
    let alerts = engine.scan_periodic().await;
    if alerts.is_empty() {
        return "No alerts found.\n".to_string();
    }

    let mut out = String::new();
    let now = engine.clock().time_of_day();
    if is_quiet_hours(&now) {
        out.push_str(&format!(
            "Note: {now} is within quiet hours; the scheduler would hold these.\n\n"
        ));
    }
    for alert in &alerts {
        out.push_str(&engine.format_alert(alert));
        out.push_str("\n\n");
    }
    out.push_str(&format!("{} alert(s) due.\n", alerts.len()));
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use renewbot_test_utils::{FixedClock, MockStore, sheet_row};

    fn engine_at(time: &str) -> AlertEngine {
        let store = Arc::new(MockStore::new(vec![
            sheet_row("key", "secret", "category", "remaining", "expiry"),
            sheet_row("a@x.com", "p1", "Office 365", "0", "21:00:00"),
            sheet_row("b@x.com", "p2", "Copilot Pro", "5", "09:00:00"),
        ]));
        let clock = Arc::new(FixedClock::at("2026-03-01", time));
        AlertEngine::new(store, clock)
    }

    #[tokio::test]
    async fn check_lists_due_alerts() {
        let out = render_check(&engine_at("22:00:00")).await;
        assert!(out.contains("a@x.com"));
        assert!(!out.contains("b@x.com"));
        assert!(out.contains("quiet hours"));
        assert!(out.ends_with("1 alert(s) due.\n"));
    }

    #[tokio::test]
    async fn check_reports_nothing_due() {
        let out = render_check(&engine_at("20:00:00")).await;
        assert_eq!(out, "No alerts found.\n");
    }
}
