// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message templates for alerts and the daily digest.

use renewbot_core::AlertInstance;

/// Category keyword selecting the Copilot templates (matched case-insensitively).
pub const COPILOT_KEYWORD: &str = "copilot";

pub const COPILOT_TITLE: &str = "🔔 Renew Copilot:";
pub const OFFICE_TITLE: &str = "🔔 Renew 365:";

/// Sent as the daily summary when nothing is due.
pub const NO_EXPIRED_MESSAGE: &str = "✅ No expired accounts today.";

/// Whether a category selects the Copilot template.
pub fn is_copilot(category: &str) -> bool {
    category.to_lowercase().contains(COPILOT_KEYWORD)
}

/// Renders one alert. Key and secret are inline code spans so they copy cleanly.
pub fn format_alert(alert: &AlertInstance) -> String {
    let title = if is_copilot(&alert.category) {
        COPILOT_TITLE
    } else {
        OFFICE_TITLE
    };

    format!(
        "{title}\nEmail: `{}`\nPassword: `{}`\nGiờ hết hạn: {}",
        alert.key, alert.secret, alert.expiry_clock
    )
}

/// Renders the daily digest for `date` (`YYYY-MM-DD`).
///
/// Copilot rows are listed first; an empty group is omitted entirely.
pub fn format_daily_summary(alerts: &[AlertInstance], date: &str) -> String {
    if alerts.is_empty() {
        return NO_EXPIRED_MESSAGE.to_string();
    }

    let (copilot, office): (Vec<&AlertInstance>, Vec<&AlertInstance>) =
        alerts.iter().partition(|a| is_copilot(&a.category));

    let mut out = format!(
        "📋 Daily summary {date}: {} expired account(s)",
        alerts.len()
    );
    for (heading, group) in [("Copilot", copilot), ("365", office)] {
        if group.is_empty() {
            continue;
        }
        out.push_str("\n\n");
        out.push_str(heading);
        out.push(':');
        for alert in group {
            out.push_str(&format!("\n• {} — {}", alert.key, alert.expiry_clock));
        }
    }
    out
}
