// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages and deletions for assertion in tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use renewbot_core::traits::{ChannelAdapter, PluginAdapter};
use renewbot_core::types::{
    AdapterType, DestinationId, HealthStatus, InboundEvent, MessageId, OutboundMessage,
};
use renewbot_core::RenewError;

/// A message captured by [`MockChannel::send`], with the id it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: MessageId,
    pub message: OutboundMessage,
}

/// A mock messaging channel for testing.
///
/// Provides three queues:
/// - **inbound**: events injected via `inject_event()` are returned by `receive()`
/// - **sent**: messages passed to `send()`, retrievable via `sent_messages()`
/// - **deleted**: `(destination, message)` pairs passed to `delete()`
///
/// Message ids are assigned sequentially from 1.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundEvent>>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    deleted: Arc<Mutex<Vec<(DestinationId, MessageId)>>>,
    failing: Arc<Mutex<HashSet<DestinationId>>>,
    fail_deletes: AtomicBool,
    send_delay_ms: AtomicU64,
    next_id: AtomicI64,
    notify: Arc<Notify>,
}

impl MockChannel {
    /// Create a new mock channel with empty queues.
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            fail_deletes: AtomicBool::new(false),
            send_delay_ms: AtomicU64::new(0),
            next_id: AtomicI64::new(1),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Inject an inbound event; the next `receive()` returns it.
    pub async fn inject_event(&self, event: InboundEvent) {
        self.inbound.lock().await.push_back(event);
        self.notify.notify_one();
    }

    /// All messages sent so far, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one destination, in order.
    pub async fn sent_to(&self, destination: DestinationId) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| s.message.destination == destination)
            .cloned()
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Every successful deletion, in order.
    pub async fn deleted_messages(&self) -> Vec<(DestinationId, MessageId)> {
        self.deleted.lock().await.clone()
    }

    /// Makes every send to `destination` fail.
    pub async fn fail_destination(&self, destination: DestinationId) {
        self.failing.lock().await.insert(destination);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Makes every send wait `delay` before it completes, like a slow network.
    pub fn set_send_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.send_delay_ms.store(millis, Ordering::SeqCst);
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, RenewError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RenewError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), RenewError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, RenewError> {
        if self.failing.lock().await.contains(&msg.destination) {
            return Err(RenewError::channel(format!(
                "mock send failure for {}",
                msg.destination
            )));
        }
        let delay = self.send_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().await.push(SentMessage { id, message: msg });
        Ok(id)
    }

    async fn delete(&self, destination: DestinationId, message: MessageId) -> Result<(), RenewError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RenewError::channel("mock delete failure"));
        }
        self.deleted.lock().await.push((destination, message));
        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, RenewError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Ok(event);
                }
            }
            self.notify.notified().await;
        }
    }
}
