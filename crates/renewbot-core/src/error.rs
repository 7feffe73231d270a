// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for renewbot.

use thiserror::Error;

/// The primary error type used across all renewbot adapters and jobs.
#[derive(Debug, Error)]
pub enum RenewError {
    /// Configuration errors (missing token, malformed credentials file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Record store errors (network, auth, unexpected response shape).
    #[error("record store error: {message}")]
    Store {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel adapter errors (send/delete rejected, bot removed from group).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Whitelist file could not be read or written.
    #[error("whitelist error: {message}")]
    Whitelist {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Scheduler setup or trigger computation failed.
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RenewError {
    /// Shorthand for a store error without an underlying source.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }
}
