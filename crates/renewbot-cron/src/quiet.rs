// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nightly window during which periodic alerts are suppressed.

/// Quiet hours start at this time of day (inclusive).
pub const QUIET_START: &str = "22:30:00";

/// Quiet hours end at this time of day (exclusive).
pub const QUIET_END: &str = "07:00:00";

/// Whether `now` (`HH:MM:SS`) falls in the quiet window, which wraps midnight.
pub fn is_quiet_hours(now: &str) -> bool {
    now >= QUIET_START || now < QUIET_END
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_window() {
        for now in ["22:30:00", "23:59:59", "00:00:00", "06:59:59"] {
            assert!(is_quiet_hours(now), "{now}");
        }
    }

    #[test]
    fn outside_window() {
        for now in ["07:00:00", "12:00:00", "22:29:59"] {
            assert!(!is_quiet_hours(now), "{now}");
        }
    }
}
