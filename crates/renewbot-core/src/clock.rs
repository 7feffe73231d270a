// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock abstraction.
//!
//! Every date and time-of-day string the bot compares or writes is taken
//! from a [`Clock`] in the configured local offset, so tests can pin "now".

use chrono::{DateTime, FixedOffset, Utc};

/// Format of the time-of-day strings compared against the expiry column.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Format of the date written back on renewal.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current local time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current time of day as `HH:MM:SS`.
    fn time_of_day(&self) -> String {
        self.now().format(TIME_FORMAT).to_string()
    }

    /// Current date as `YYYY-MM-DD`.
    fn date(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }
}

/// The system clock shifted into a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a clock from an offset in minutes east of UTC.
    ///
    /// Returns `None` if the offset is out of chrono's accepted range.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }
}
