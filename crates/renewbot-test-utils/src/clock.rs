// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A clock that only moves when told to.

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use renewbot_core::Clock;

/// Offset used by [`FixedClock::at`]: UTC+7.
const DEFAULT_OFFSET_SECS: i32 = 7 * 3600;

pub struct FixedClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Pins the clock to `date` (`YYYY-MM-DD`) and `time` (`HH:MM:SS`) at UTC+7.
    ///
    /// Panics on malformed input; this is test-only code.
    pub fn at(date: &str, time: &str) -> Self {
        Self::new(instant(date, time))
    }

    /// Moves the clock to a new local date and time.
    pub fn set(&self, date: &str, time: &str) {
        *self.now.lock().expect("clock lock poisoned") = instant(date, time);
    }
}

fn instant(date: &str, time: &str) -> DateTime<FixedOffset> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date must be YYYY-MM-DD");
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").expect("time must be HH:MM:SS");
    let offset = FixedOffset::east_opt(DEFAULT_OFFSET_SECS).expect("valid offset");
    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .expect("fixed offsets are unambiguous")
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().expect("clock lock poisoned")
    }
}
