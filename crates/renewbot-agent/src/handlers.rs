// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command and reply handling.

use std::sync::Arc;

use renewbot_alerts::AlertEngine;
use renewbot_core::types::{BotCommand, ChatRef, InboundEvent, OutboundMessage};
use renewbot_core::{ChannelAdapter, MessageId, RenewError};
use tracing::{debug, error, info, warn};

use crate::delivery::deliver_alerts;
use crate::whitelist::Whitelist;

pub const HELP_TEXT: &str = "Renewal reminder bot\n\n\
    Available commands:\n\
    /startmon - Enable monitoring for this group\n\
    /renew <key> - Mark an account renewed by key\n\
    /check - Run an alert check now\n\n\
    Reply 'done' to any alert to mark it as renewed.";

pub const GROUPS_ONLY: &str = "This command only works in groups!";
pub const ALREADY_MONITORING: &str = "Monitoring is already enabled for this group!";
pub const RENEW_USAGE: &str = "Usage: /renew <key>";
pub const CHECK_STARTED: &str = "Running manual check...";
pub const NO_ALERTS: &str = "No alerts found.";
pub const DONE_FAILED: &str = "Failed to update. Please try again or use /renew command.";

/// Reply text that confirms a renewal.
const DONE_KEYWORD: &str = "done";

/// Routes inbound events to the alert engine and the whitelist.
pub struct CommandHandler {
    channel: Arc<dyn ChannelAdapter>,
    engine: Arc<AlertEngine>,
    whitelist: Arc<Whitelist>,
    check_interval_minutes: u64,
}

impl CommandHandler {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        engine: Arc<AlertEngine>,
        whitelist: Arc<Whitelist>,
        check_interval_minutes: u64,
    ) -> Self {
        Self {
            channel,
            engine,
            whitelist,
            check_interval_minutes,
        }
    }

    /// Handles one inbound event. Only failures to reply are returned.
    pub async fn handle(&self, event: InboundEvent) -> Result<(), RenewError> {
        match event {
            InboundEvent::Command {
                chat,
                message_id,
                command,
            } => {
                debug!(chat = %chat.id, kind = %chat.kind, ?command, "handling command");
                match command {
                    BotCommand::Help => self.reply(chat, message_id, HELP_TEXT).await,
                    BotCommand::StartMonitoring => self.start_monitoring(chat, message_id).await,
                    BotCommand::Renew(key) => self.renew(chat, message_id, &key).await,
                    BotCommand::Check => self.check(chat, message_id).await,
                }
            }
            InboundEvent::Reply {
                chat,
                message_id,
                replied_to,
                text,
            } => self.done_reply(chat, message_id, replied_to, &text).await,
        }
    }

    async fn start_monitoring(&self, chat: ChatRef, message_id: MessageId) -> Result<(), RenewError> {
        if !chat.is_group() {
            return self.reply(chat, message_id, GROUPS_ONLY).await;
        }

        match self.whitelist.enable(chat.id).await {
            Ok(true) => {
                info!(group = %chat.id, "monitoring enabled");
                let text = format!(
                    "Monitoring enabled for this group!\nGroup ID: {}\nYou will now receive alerts every {} minutes.",
                    chat.id, self.check_interval_minutes
                );
                self.reply(chat, message_id, &text).await
            }
            Ok(false) => self.reply(chat, message_id, ALREADY_MONITORING).await,
            Err(e) => {
                error!(group = %chat.id, error = %e, "failed to enable monitoring");
                self.reply(chat, message_id, "Failed to enable monitoring. Please try again.")
                    .await
            }
        }
    }

    async fn renew(&self, chat: ChatRef, message_id: MessageId, key: &str) -> Result<(), RenewError> {
        let key = key.trim();
        if key.is_empty() {
            return self.reply(chat, message_id, RENEW_USAGE).await;
        }

        let Some(row) = self.engine.store().find_row_by_key(key).await else {
            warn!(key, "key not found for renewal");
            return self.reply(chat, message_id, &format!("Key not found: {key}")).await;
        };

        if self.engine.mark_renewed(row).await {
            info!(key, row, "manual renewal completed");
            let text = format!("Successfully renewed for {key}\nUpdated at: {}", self.timestamp());
            self.reply(chat, message_id, &text).await
        } else {
            let text = format!("Failed to renew for {key}. Please try again.");
            self.reply(chat, message_id, &text).await
        }
    }

    async fn check(&self, chat: ChatRef, message_id: MessageId) -> Result<(), RenewError> {
        self.reply(chat, message_id, CHECK_STARTED).await?;

        let alerts = self.engine.scan_periodic().await;
        if alerts.is_empty() {
            return self.reply(chat, message_id, NO_ALERTS).await;
        }

        let report = deliver_alerts(self.channel.as_ref(), &self.engine, &[chat.id], &alerts).await;
        info!(chat = %chat.id, sent = report.sent, failed = report.failed, "manual check delivered");
        self.reply(chat, message_id, &format!("Sent {} alert(s).", report.sent))
            .await
    }

    async fn done_reply(
        &self,
        chat: ChatRef,
        message_id: MessageId,
        replied_to: MessageId,
        text: &str,
    ) -> Result<(), RenewError> {
        if !text.trim().eq_ignore_ascii_case(DONE_KEYWORD) {
            return Ok(());
        }

        let Some(row) = self.engine.resolve_row_for_message(chat.id, replied_to).await else {
            debug!(chat = %chat.id, %replied_to, "reply to untracked message ignored");
            return Ok(());
        };

        if self.engine.mark_renewed(row).await {
            self.engine.forget(chat.id, replied_to).await;
            info!(row, chat = %chat.id, "renewal confirmed via reply");
            let text = format!("Renewal confirmed!\nUpdated at: {}", self.timestamp());
            self.reply(chat, message_id, &text).await
        } else {
            self.reply(chat, message_id, DONE_FAILED).await
        }
    }

    fn timestamp(&self) -> String {
        let clock = self.engine.clock();
        format!("{} {}", clock.date(), clock.time_of_day())
    }

    async fn reply(&self, chat: ChatRef, message_id: MessageId, text: &str) -> Result<(), RenewError> {
        self.channel
            .send(OutboundMessage::plain(chat.id, text).in_reply_to(message_id))
            .await
            .map(|_| ())
    }
}
