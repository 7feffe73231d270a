// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for renewbot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide,
//! providing long polling, command and reply classification, message
//! deletion, and MarkdownV2 formatting.

pub mod handler;
pub mod markdown;

use std::sync::Arc;

use async_trait::async_trait;
use renewbot_config::model::TelegramConfig;
use renewbot_core::error::RenewError;
use renewbot_core::traits::{ChannelAdapter, PluginAdapter};
use renewbot_core::types::{
    AdapterType, DestinationId, HealthStatus, InboundEvent, MessageId, OutboundMessage,
    TextFormat,
};
use teloxide::ApiError;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId as TgMessageId, ParseMode, ReplyParameters};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects to Telegram via long polling and forwards commands and replies
/// from any chat; whether a chat may use a command is decided upstream.
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, RenewError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RenewError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(RenewError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

fn channel_error(action: &str, e: teloxide::RequestError) -> RenewError {
    RenewError::Channel {
        message: format!("failed to {action}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Only a rejected MarkdownV2 entity means the message was not posted and
/// can be resent as plain text. Transport failures may have been delivered.
fn is_markdown_rejection(e: &teloxide::RequestError) -> bool {
    matches!(
        e,
        teloxide::RequestError::Api(ApiError::CantParseEntities(_))
    )
}

fn telegram_message_id(id: MessageId) -> Result<TgMessageId, RenewError> {
    i32::try_from(id.0)
        .map(TgMessageId)
        .map_err(|_| RenewError::channel(format!("message id {id} out of range for Telegram")))
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RenewError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RenewError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), RenewError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        // Commands addressed to another bot are ignored, so learn our own name.
        let username: Arc<Option<String>> = Arc::new(match self.bot.get_me().await {
            Ok(me) => me.username.clone(),
            Err(e) => {
                warn!(error = %e, "getMe failed, accepting commands addressed to any bot");
                None
            }
        });

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!(username = ?username, "starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(move |msg: Message| {
                let tx = tx.clone();
                let username = username.clone();
                async move {
                    match handler::to_inbound_event(&msg, username.as_deref()) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(chat_id = msg.chat.id.0, msg_id = msg.id.0, "ignoring message");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(bot, handler)
                .default_handler(|_| async {}) // Silently ignore non-message updates
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RenewError> {
        let chat_id = ChatId(msg.destination.0);
        let reply_to = msg.reply_to.map(telegram_message_id).transpose()?;

        let plain = || {
            let request = self.bot.send_message(chat_id, msg.text.clone());
            match reply_to {
                Some(id) => request.reply_parameters(ReplyParameters::new(id)),
                None => request,
            }
        };

        let sent = match msg.format {
            TextFormat::Plain => plain().await.map_err(|e| channel_error("send message", e))?,
            TextFormat::Markdown => {
                let escaped = markdown::escape_markdown_v2(&msg.text);
                let mut request = self
                    .bot
                    .send_message(chat_id, escaped)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(id) = reply_to {
                    request = request.reply_parameters(ReplyParameters::new(id));
                }
                // Try MarkdownV2 first, fall back to plain text if Telegram rejects the entities
                match request.await {
                    Ok(sent) => sent,
                    Err(e) if is_markdown_rejection(&e) => {
                        warn!(error = %e, "MarkdownV2 rejected, sending as plain text");
                        plain().await.map_err(|e| channel_error("send message", e))?
                    }
                    Err(e) => return Err(channel_error("send message", e)),
                }
            }
        };

        Ok(MessageId(i64::from(sent.id.0)))
    }

    async fn delete(&self, destination: DestinationId, message: MessageId) -> Result<(), RenewError> {
        self.bot
            .delete_message(ChatId(destination.0), telegram_message_id(message)?)
            .await
            .map_err(|e| channel_error("delete message", e))?;
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, RenewError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| RenewError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramChannel::new(&config(None)).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        assert!(TelegramChannel::new(&config(Some("  "))).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        assert!(TelegramChannel::new(&config(Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11"))).is_ok());
    }

    #[test]
    fn message_ids_must_fit_telegram_range() {
        assert_eq!(telegram_message_id(MessageId(42)).unwrap(), TgMessageId(42));
        assert!(telegram_message_id(MessageId(i64::MAX)).is_err());
    }

    #[test]
    fn only_entity_errors_fall_back_to_plain_text() {
        let rejected = teloxide::RequestError::Api(ApiError::CantParseEntities(
            "Bad Request: can't parse entities".into(),
        ));
        assert!(is_markdown_rejection(&rejected));

        let blocked = teloxide::RequestError::Api(ApiError::BotBlocked);
        assert!(!is_markdown_rejection(&blocked));

        let transport = teloxide::RequestError::Io(std::io::Error::other("connection reset").into());
        assert!(!is_markdown_rejection(&transport));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(&config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }
}
