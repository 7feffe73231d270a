// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert and summary eligibility predicates.
//!
//! Time-of-day comparison is lexical on `HH:MM:SS` strings, exactly as the
//! sheet stores them. A malformed expiry cell therefore compares however its
//! characters compare; it is never parsed as a time.

use renewbot_core::Record;

/// Whether a row should be alerted on by the periodic check at `now` (`HH:MM:SS`).
///
/// Overdue rows (`remaining < 0`) always qualify. Rows expiring today
/// (`remaining == 0`) qualify once their expiry clock has passed.
pub fn is_periodic_eligible(record: &Record, now: &str) -> bool {
    record.remaining < 0 || (record.remaining == 0 && record.expiry_clock.as_str() < now)
}

/// Whether a row belongs in the daily summary: anything due today or overdue.
pub fn is_summary_eligible(record: &Record) -> bool {
    record.remaining <= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(remaining: i64, expiry: &str) -> Record {
        Record {
            row_index: 2,
            key: "a@x.com".into(),
            secret: "p1".into(),
            category: "Office 365".into(),
            remaining,
            expiry_clock: expiry.into(),
        }
    }

    fn clock() -> impl Strategy<Value = String> {
        (0u32..24, 0u32..60, 0u32..60).prop_map(|(h, m, s)| format!("{h:02}:{m:02}:{s:02}"))
    }

    #[test]
    fn due_today_depends_on_clock() {
        let row = record(0, "21:00:00");
        assert!(is_periodic_eligible(&row, "22:00:00"));
        assert!(!is_periodic_eligible(&row, "20:00:00"));
        assert!(!is_periodic_eligible(&row, "21:00:00"));
    }

    #[test]
    fn comparison_is_lexical() {
        // "9:00:00" sorts after "10:00:00" as text.
        let row = record(0, "9:00:00");
        assert!(!is_periodic_eligible(&row, "10:00:00"));
    }

    proptest! {
        #[test]
        fn overdue_rows_always_alert(remaining in i64::MIN..0, expiry in clock(), now in clock()) {
            prop_assert!(is_periodic_eligible(&record(remaining, &expiry), &now));
        }

        #[test]
        fn future_rows_never_alert(remaining in 1..i64::MAX, expiry in clock(), now in clock()) {
            prop_assert!(!is_periodic_eligible(&record(remaining, &expiry), &now));
        }

        #[test]
        fn due_today_alerts_iff_expiry_passed(expiry in clock(), now in clock()) {
            prop_assert_eq!(is_periodic_eligible(&record(0, &expiry), &now), expiry < now);
        }

        #[test]
        fn summary_is_exactly_non_positive(remaining in any::<i64>()) {
            prop_assert_eq!(is_summary_eligible(&record(remaining, "12:00:00")), remaining <= 0);
        }

        #[test]
        fn periodic_implies_summary(remaining in -5i64..5, expiry in clock(), now in clock()) {
            let row = record(remaining, &expiry);
            if is_periodic_eligible(&row, &now) {
                prop_assert!(is_summary_eligible(&row));
            }
        }
    }

    #[test]
    fn summary_is_wider_than_periodic() {
        let row = record(0, "23:00:00");
        assert!(is_summary_eligible(&row));
        assert!(!is_periodic_eligible(&row, "07:00:00"));
    }
}
