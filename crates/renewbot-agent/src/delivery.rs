// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The one delivery routine shared by the scheduler and the `/check` command.

use renewbot_alerts::AlertEngine;
use renewbot_core::types::OutboundMessage;
use renewbot_core::{AlertInstance, ChannelAdapter, DestinationId};
use tracing::{error, info, warn};

/// Counts from one delivery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Alerts sent and registered.
    pub sent: usize,
    /// Sends that failed.
    pub failed: usize,
    /// Older alerts for the same key and destination that were superseded.
    pub superseded: usize,
}

/// Sends every alert to every destination.
///
/// For each `(destination, alert)` pair, live messages for the same key in
/// that destination are deleted and forgotten first, then the new alert is
/// sent and registered. A superseded message is forgotten even when the
/// delete fails, so at most one tracked message remains per pair. Failures
/// are logged per pair and never stop the pass. Concurrent passes on the
/// same engine run one after another.
pub async fn deliver_alerts(
    channel: &dyn ChannelAdapter,
    engine: &AlertEngine,
    destinations: &[DestinationId],
    alerts: &[AlertInstance],
) -> DeliveryReport {
    let _pass = engine.lock_delivery().await;
    let mut report = DeliveryReport::default();

    for &destination in destinations {
        for alert in alerts {
            report.superseded += supersede(channel, engine, destination, &alert.key).await;

            let text = engine.format_alert(alert);
            match channel.send(OutboundMessage::markdown(destination, text)).await {
                Ok(message_id) => {
                    engine
                        .register_delivery(message_id, alert.row_index, &alert.key, destination)
                        .await;
                    report.sent += 1;
                    info!(
                        %destination,
                        row = alert.row_index,
                        key = %alert.key,
                        %message_id,
                        "alert sent"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(%destination, row = alert.row_index, error = %e, "failed to send alert");
                }
            }
        }
    }

    report
}

async fn supersede(
    channel: &dyn ChannelAdapter,
    engine: &AlertEngine,
    destination: DestinationId,
    key: &str,
) -> usize {
    let pending = engine.pending_messages_for(key, destination).await;
    for &old in &pending {
        match channel.delete(destination, old).await {
            Ok(()) => info!(%destination, message_id = %old, key, "deleted superseded alert"),
            Err(e) => warn!(%destination, message_id = %old, error = %e, "failed to delete superseded alert"),
        }
        engine.forget(destination, old).await;
    }
    pending.len()
}

/// Sends the same text to every destination, one message each.
///
/// Returns how many sends succeeded.
pub async fn broadcast(channel: &dyn ChannelAdapter, destinations: &[DestinationId], text: &str) -> usize {
    let mut sent = 0;
    for &destination in destinations {
        match channel.send(OutboundMessage::plain(destination, text)).await {
            Ok(_) => sent += 1,
            Err(e) => error!(%destination, error = %e, "failed to broadcast message"),
        }
    }
    sent
}
