// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert engine for renewbot.
//!
//! Decides which sheet rows are alert-worthy (periodic check) or
//! summary-worthy (daily digest), renders their messages, writes renewals back
//! to the record store, and tracks which delivered message belongs to which
//! row so a "done" reply can be traced home.

pub mod classify;
pub mod engine;
pub mod format;
pub mod tracking;

pub use engine::AlertEngine;
pub use tracking::TrackingTable;
