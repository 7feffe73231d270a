// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery and command layer for renewbot.
//!
//! - [`delivery`]: the single routine that sends alerts to a set of
//!   destinations, superseding older alerts for the same key
//! - [`handlers`]: `/start`, `/startmon`, `/renew`, `/check`, and "done" replies
//! - [`whitelist`]: the persisted set of groups that receive alerts
//! - [`EventLoop`]: pulls inbound events from the channel until shutdown

pub mod delivery;
pub mod handlers;
pub mod shutdown;
pub mod whitelist;

use std::sync::Arc;

use renewbot_core::ChannelAdapter;
use renewbot_core::error::RenewError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub use delivery::{DeliveryReport, broadcast, deliver_alerts};
pub use handlers::CommandHandler;
pub use whitelist::Whitelist;

/// Feeds inbound channel events to the [`CommandHandler`] one at a time.
pub struct EventLoop {
    channel: Arc<dyn ChannelAdapter>,
    handler: CommandHandler,
}

impl EventLoop {
    pub fn new(channel: Arc<dyn ChannelAdapter>, handler: CommandHandler) -> Self {
        Self { channel, handler }
    }

    /// Runs until the token is cancelled or the channel closes.
    ///
    /// Handler errors are logged and never stop the loop.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RenewError> {
        info!("event loop running");

        loop {
            tokio::select! {
                event = self.channel.receive() => {
                    match event {
                        Ok(event) => {
                            if let Err(e) = self.handler.handle(event).await {
                                error!(error = %e, "failed to handle inbound event");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            // If the channel is closed, break out of the loop.
                            if e.to_string().contains("closed") {
                                break;
                            }
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping event loop");
                    break;
                }
            }
        }

        info!("event loop stopped");
        Ok(())
    }
}
