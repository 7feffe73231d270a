// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Sheets record store for renewbot.
//!
//! Implements [`RecordStore`](renewbot_core::RecordStore) over the Sheets v4
//! values API, authenticated either with a static bearer token or a service
//! account key.

pub mod auth;
pub mod client;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};
pub use client::SheetsClient;
