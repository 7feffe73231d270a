// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory correlation of delivered alerts to sheet rows.
//!
//! Two indexes are kept in step: `(destination, message)` to
//! [`TrackedMessage`], and key to the `(destination, message)` pairs still
//! live for it. Message ids are only unique within one chat, so lookups
//! always carry the destination. Nothing here is persisted; a restart starts
//! from an empty table.

use std::collections::HashMap;

use renewbot_core::{DestinationId, MessageId, TrackedMessage};

#[derive(Debug, Default)]
pub struct TrackingTable {
    by_message: HashMap<(DestinationId, MessageId), TrackedMessage>,
    by_key: HashMap<String, Vec<(DestinationId, MessageId)>>,
}

impl TrackingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a delivered alert. Re-registering a message id replaces the old entry.
    pub fn register(&mut self, tracked: TrackedMessage) {
        self.forget(tracked.destination, tracked.message_id);
        self.by_key
            .entry(tracked.key.clone())
            .or_default()
            .push((tracked.destination, tracked.message_id));
        self.by_message
            .insert((tracked.destination, tracked.message_id), tracked);
    }

    /// Row index behind a delivered message.
    pub fn resolve_row(&self, destination: DestinationId, message_id: MessageId) -> Option<usize> {
        self.get(destination, message_id).map(|t| t.row_index)
    }

    pub fn get(&self, destination: DestinationId, message_id: MessageId) -> Option<&TrackedMessage> {
        self.by_message.get(&(destination, message_id))
    }

    /// Live messages for a key in one destination, oldest first.
    pub fn pending_for(&self, key: &str, destination: DestinationId) -> Vec<MessageId> {
        self.by_key
            .get(key)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter(|(dest, _)| *dest == destination)
                    .map(|(_, id)| *id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops a message from both indexes. Unknown ids are ignored.
    pub fn forget(
        &mut self,
        destination: DestinationId,
        message_id: MessageId,
    ) -> Option<TrackedMessage> {
        let tracked = self.by_message.remove(&(destination, message_id))?;
        if let Some(pairs) = self.by_key.get_mut(&tracked.key) {
            pairs.retain(|pair| *pair != (destination, message_id));
            if pairs.is_empty() {
                self.by_key.remove(&tracked.key);
            }
        }
        Some(tracked)
    }

    pub fn len(&self) -> usize {
        self.by_message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_message.is_empty()
    }

    /// Number of keys with at least one live message.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}
