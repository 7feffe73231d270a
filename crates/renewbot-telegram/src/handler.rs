// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of incoming Telegram messages.
//!
//! Turns a teloxide [`Message`] into a channel-agnostic [`InboundEvent`]:
//! a recognised command, or a plain-text reply to an earlier message.
//! Everything else is dropped.

use renewbot_core::types::{BotCommand, ChatKind, ChatRef, InboundEvent};
use renewbot_core::{DestinationId, MessageId};
use teloxide::types::Message;

/// Maps the Telegram chat type onto [`ChatKind`].
pub fn chat_kind(msg: &Message) -> ChatKind {
    if msg.chat.is_supergroup() {
        ChatKind::Supergroup
    } else if msg.chat.is_group() {
        ChatKind::Group
    } else if msg.chat.is_channel() {
        ChatKind::Channel
    } else {
        ChatKind::Private
    }
}

/// Parses `/command[@bot] args`.
///
/// A command addressed to a different bot (`/check@otherbot`) is not ours and
/// yields `None`, as does any unknown command.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<BotCommand> {
    let text = text.trim_start();
    let body = text.strip_prefix('/')?;
    let (head, args) = match body.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (body, ""),
    };

    let name = match head.split_once('@') {
        Some((name, target)) => {
            if let Some(me) = bot_username
                && !target.eq_ignore_ascii_case(me)
            {
                return None;
            }
            name
        }
        None => head,
    };

    match name {
        "start" | "help" => Some(BotCommand::Help),
        "startmon" => Some(BotCommand::StartMonitoring),
        "renew" => Some(BotCommand::Renew(args.to_string())),
        "check" => Some(BotCommand::Check),
        _ => None,
    }
}

/// Converts a text message into an [`InboundEvent`].
///
/// Commands take precedence; text starting with `/` that is not one of our
/// commands is dropped rather than treated as a reply.
pub fn to_inbound_event(msg: &Message, bot_username: Option<&str>) -> Option<InboundEvent> {
    let text = msg.text()?;
    let chat = ChatRef {
        id: DestinationId(msg.chat.id.0),
        kind: chat_kind(msg),
    };
    let message_id = MessageId(i64::from(msg.id.0));

    if text.trim_start().starts_with('/') {
        return parse_command(text, bot_username).map(|command| InboundEvent::Command {
            chat,
            message_id,
            command,
        });
    }

    let replied = msg.reply_to_message()?;
    Some(InboundEvent::Reply {
        chat,
        message_id,
        replied_to: MessageId(i64::from(replied.id.0)),
        text: text.to_string(),
    })
}
