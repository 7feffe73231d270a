// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the alert engine, the scheduler, and the adapters.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a chat destination (a whitelisted group, or the chat a command came from).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub i64);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message within its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    RecordStore,
}

/// A scan-time decision that a record currently warrants notification.
///
/// Lives only for the duration of one delivery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertInstance {
    pub row_index: usize,
    pub key: String,
    pub secret: String,
    pub category: String,
    pub expiry_clock: String,
    pub remaining: Option<i64>,
}

/// Correlates one delivered notification with the row and destination it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedMessage {
    pub message_id: MessageId,
    pub row_index: usize,
    pub key: String,
    pub destination: DestinationId,
}

/// Date and time-of-day written back to a row when it is marked renewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalStamp {
    /// `YYYY-MM-DD`, written to column G.
    pub date: String,
    /// `HH:MM:SS`, written to column I.
    pub time: String,
}

/// How the channel should render an outbound text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    /// Inline code spans (`` `...` ``) are rendered as code, everything else literally.
    Markdown,
}

/// An outbound message to be sent via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub destination: DestinationId,
    pub text: String,
    pub format: TextFormat,
    pub reply_to: Option<MessageId>,
}

impl OutboundMessage {
    pub fn plain(destination: DestinationId, text: impl Into<String>) -> Self {
        Self {
            destination,
            text: text.into(),
            format: TextFormat::Plain,
            reply_to: None,
        }
    }

    pub fn markdown(destination: DestinationId, text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Markdown,
            ..Self::plain(destination, text)
        }
    }

    /// Threads this message as a reply to `message`.
    pub fn in_reply_to(mut self, message: MessageId) -> Self {
        self.reply_to = Some(message);
        self
    }
}

/// Kind of chat an inbound event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// The chat an inbound event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRef {
    pub id: DestinationId,
    pub kind: ChatKind,
}

impl ChatRef {
    /// Group and supergroup chats are the only ones that can be whitelisted.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatKind::Group | ChatKind::Supergroup)
    }
}

/// Commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` or `/help`.
    Help,
    /// `/startmon`: enable monitoring for the current group.
    StartMonitoring,
    /// `/renew <key>`: the key may contain spaces and may be empty.
    Renew(String),
    /// `/check`: run a check now and deliver to the current chat.
    Check,
}

/// An inbound event received from a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Command {
        chat: ChatRef,
        message_id: MessageId,
        command: BotCommand,
    },
    /// A non-command text message that replies to an earlier message.
    Reply {
        chat: ChatRef,
        message_id: MessageId,
        replied_to: MessageId,
        text: String,
    },
}

impl InboundEvent {
    pub fn chat(&self) -> ChatRef {
        match self {
            Self::Command { chat, .. } | Self::Reply { chat, .. } => *chat,
        }
    }
}
