// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed time-of-day trigger backed by a cron pattern.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use croner::Cron;
use renewbot_core::RenewError;

/// The daily summary fires at 07:00 local time.
pub const DAILY_SUMMARY_PATTERN: &str = "0 7 * * *";

#[derive(Debug, Clone)]
pub struct DailyTrigger {
    pattern: String,
    cron: Cron,
}

impl DailyTrigger {
    pub fn new(pattern: &str) -> Result<Self, RenewError> {
        let cron = pattern
            .parse::<Cron>()
            .map_err(|e| RenewError::Schedule(format!("invalid cron pattern '{pattern}': {e}")))?;
        Ok(Self {
            pattern: pattern.to_string(),
            cron,
        })
    }

    /// The 07:00 daily summary trigger.
    pub fn daily_summary() -> Result<Self, RenewError> {
        Self::new(DAILY_SUMMARY_PATTERN)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// First firing strictly after `now`, in `now`'s offset.
    pub fn next_after(&self, now: &DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, RenewError> {
        self.cron
            .find_next_occurrence(now, false)
            .map_err(|e| RenewError::Schedule(format!("no next occurrence for '{}': {e}", self.pattern)))
    }

    /// Time to wait from `now` until the next firing.
    pub fn delay_from(&self, now: &DateTime<FixedOffset>) -> Result<Duration, RenewError> {
        self.next_firing(now, None).map(|(_, delay)| delay)
    }

    /// Next firing and the wait until it, never at or before `last_fired`.
    ///
    /// The wall clock may still read just before the occurrence that was
    /// fired, so the search starts from whichever of `now` and `last_fired`
    /// is later.
    pub fn next_firing(
        &self,
        now: &DateTime<FixedOffset>,
        last_fired: Option<&DateTime<FixedOffset>>,
    ) -> Result<(DateTime<FixedOffset>, Duration), RenewError> {
        let from = match last_fired {
            Some(last) if last > now => last,
            _ => now,
        };
        let next = self.next_after(from)?;
        let delay = (next - *now)
            .to_std()
            .map_err(|e| RenewError::Schedule(format!("next occurrence is in the past: {e}")))?;
        Ok((next, delay))
    }
}
