// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The alert engine: scans the record store, decides what to alert on, and
//! owns the table correlating delivered alerts back to rows.

use std::sync::Arc;

use renewbot_core::record::{self, DATA_RANGE};
use renewbot_core::types::RenewalStamp;
use renewbot_core::{
    AlertInstance, Clock, DestinationId, MessageId, Record, RecordStore, TrackedMessage,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};

use crate::classify::{is_periodic_eligible, is_summary_eligible};
use crate::format;
use crate::tracking::TrackingTable;

/// Scans rows and tracks delivered alerts.
///
/// One instance is shared (behind `Arc`) by the scheduler and the command
/// handlers. The tracking table sits behind a single lock so each tracking
/// operation is atomic on its own; a whole delivery pass is serialized by
/// [`AlertEngine::lock_delivery`].
pub struct AlertEngine {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    tracking: Mutex<TrackingTable>,
    delivery: Mutex<()>,
}

impl AlertEngine {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            tracking: Mutex::new(TrackingTable::new()),
            delivery: Mutex::new(()),
        }
    }

    /// Held for a whole delivery pass so the lookup, delete, send and register
    /// steps of concurrent passes never interleave.
    pub async fn lock_delivery(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().await
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Rows due for a periodic alert right now, in ascending row order.
    ///
    /// A failed fetch is logged and yields an empty list.
    pub async fn scan_periodic(&self) -> Vec<AlertInstance> {
        let now = self.clock.time_of_day();
        let Some(records) = self.fetch_records().await else {
            return Vec::new();
        };

        info!(rows = records.len(), now = %now, "checking rows for alerts");

        let alerts: Vec<AlertInstance> = records
            .into_iter()
            .filter(|r| is_periodic_eligible(r, &now))
            .inspect(|r| {
                info!(
                    row = r.row_index,
                    key = %r.key,
                    remaining = r.remaining,
                    expiry = %r.expiry_clock,
                    "alert triggered"
                );
            })
            .map(to_instance)
            .collect();

        info!(count = alerts.len(), "periodic scan complete");
        alerts
    }

    /// Rows due today or overdue, for the daily digest.
    ///
    /// A failed fetch is logged and yields an empty list.
    pub async fn scan_daily_summary(&self) -> Vec<AlertInstance> {
        let Some(records) = self.fetch_records().await else {
            return Vec::new();
        };

        let alerts: Vec<AlertInstance> = records
            .into_iter()
            .filter(is_summary_eligible)
            .map(to_instance)
            .collect();

        info!(count = alerts.len(), "daily summary scan complete");
        alerts
    }

    /// Renders a single alert.
    pub fn format_alert(&self, alert: &AlertInstance) -> String {
        format::format_alert(alert)
    }

    /// Renders the digest stamped with today's date.
    pub fn format_daily_summary(&self, alerts: &[AlertInstance]) -> String {
        format::format_daily_summary(alerts, &self.clock.date())
    }

    /// Stamps a row as renewed now. Returns whether the write succeeded.
    pub async fn mark_renewed(&self, row_index: usize) -> bool {
        let stamp = RenewalStamp {
            date: self.clock.date(),
            time: self.clock.time_of_day(),
        };

        match self.store.write_renewal(row_index, &stamp).await {
            Ok(()) => {
                info!(row = row_index, date = %stamp.date, time = %stamp.time, "row marked renewed");
                true
            }
            Err(e) => {
                error!(row = row_index, error = %e, "failed to mark row renewed");
                false
            }
        }
    }

    /// Starts tracking a delivered alert.
    pub async fn register_delivery(
        &self,
        message_id: MessageId,
        row_index: usize,
        key: &str,
        destination: DestinationId,
    ) {
        debug!(%message_id, row = row_index, key, %destination, "tracking alert message");
        self.tracking.lock().await.register(TrackedMessage {
            message_id,
            row_index,
            key: key.to_string(),
            destination,
        });
    }

    /// Row behind a delivered alert, if it is still tracked.
    pub async fn resolve_row_for_message(
        &self,
        destination: DestinationId,
        message_id: MessageId,
    ) -> Option<usize> {
        self.tracking.lock().await.resolve_row(destination, message_id)
    }

    /// Live alerts for `key` in `destination`, which a fresh alert supersedes.
    pub async fn pending_messages_for(&self, key: &str, destination: DestinationId) -> Vec<MessageId> {
        self.tracking.lock().await.pending_for(key, destination)
    }

    /// Stops tracking a message. Unknown messages are ignored.
    pub async fn forget(&self, destination: DestinationId, message_id: MessageId) {
        if self.tracking.lock().await.forget(destination, message_id).is_some() {
            debug!(%message_id, %destination, "stopped tracking alert message");
        }
    }

    /// Number of alerts currently tracked.
    pub async fn tracked_count(&self) -> usize {
        self.tracking.lock().await.len()
    }

    async fn fetch_records(&self) -> Option<Vec<Record>> {
        match self.store.fetch_range(DATA_RANGE).await {
            Ok(rows) => Some(record::parse_rows(&rows)),
            Err(e) => {
                error!(error = %e, "failed to fetch rows");
                None
            }
        }
    }
}

fn to_instance(record: Record) -> AlertInstance {
    AlertInstance {
        row_index: record.row_index,
        key: record.key,
        secret: record.secret,
        category: record.category,
        expiry_clock: record.expiry_clock,
        remaining: Some(record.remaining),
    }
}
