// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat platform.

use async_trait::async_trait;

use crate::error::RenewError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{DestinationId, InboundEvent, MessageId, OutboundMessage};

/// Adapter for the chat platform that carries alerts and commands.
///
/// Every call is a suspension point; nothing is retried here.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Starts receiving inbound events.
    async fn connect(&mut self) -> Result<(), RenewError>;

    /// Sends a message and returns the id the platform assigned to it.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RenewError>;

    /// Deletes a previously sent message.
    async fn delete(&self, destination: DestinationId, message: MessageId)
    -> Result<(), RenewError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, RenewError>;
}
