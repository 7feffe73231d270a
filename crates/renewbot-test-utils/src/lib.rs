// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for renewbot integration tests.
//!
//! Provides mock adapters and a controllable clock for fast,
//! deterministic, CI-runnable tests without Telegram or Google Sheets.
//!
//! # Components
//!
//! - [`MockChannel`] - Mock messaging channel with event injection and capture
//! - [`MockStore`] - In-memory sheet with failure switches and write capture
//! - [`FixedClock`] - Clock pinned to a settable instant

pub mod clock;
pub mod mock_channel;
pub mod mock_store;

pub use clock::FixedClock;
pub use mock_channel::{MockChannel, SentMessage};
pub use mock_store::{MockStore, sheet_row};
