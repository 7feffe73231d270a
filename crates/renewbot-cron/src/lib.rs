// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduler for renewbot.
//!
//! Runs the periodic alert check (suppressed during quiet hours) and the
//! 07:00 daily summary from one cooperative loop.

pub mod quiet;
pub mod scheduler;
pub mod trigger;

pub use quiet::is_quiet_hours;
pub use scheduler::{JobOutcome, Scheduler, SkipReason};
pub use trigger::DailyTrigger;
