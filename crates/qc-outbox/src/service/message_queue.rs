//! # Message Queue Service
//!
//! Thread-safe outbox: the sender → `SenderQueue` store behind one
//! reader/writer lock, with metrics reported through an injected sink.
//!
//! ## Locking
//!
//! | Operation | Lock |
//! |-----------|------|
//! | `enqueue`, `remove_next`, `clear`, `expire_before` | write |
//! | `largest_nonce`, `queues`, `list`, `len`, `status` | read |
//!
//! Metrics are reported while the lock is held, so observations for one
//! sender arrive in mutation order.

use crate::adapters::NoOpMetrics;
use crate::domain::{
    Nonce, OutboundMessage, OutboxConfig, OutboxError, OutboxResult, QueueStatus, QueuedMessage,
    SenderQueue, Stamp,
};
use crate::ports::{MessageQueueApi, MetricsSink};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outbound messages that were sent but not yet confirmed, per sender.
///
/// INVARIANTS:
/// - Each sender's nonces are contiguous and increasing
/// - Only the head of a sender's queue can be removed
/// - No sender maps to an empty queue
pub struct MessageQueue<M: OutboundMessage> {
    config: OutboxConfig,
    metrics: Arc<dyn MetricsSink>,
    queues: RwLock<HashMap<M::Sender, SenderQueue<M>>>,
}

impl<M: OutboundMessage> MessageQueue<M> {
    /// Creates an empty queue with default metric names.
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            config: OutboxConfig::default(),
            metrics,
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Creates an empty queue with custom configuration.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    pub fn with_config(config: OutboxConfig, metrics: Arc<dyn MetricsSink>) -> OutboxResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metrics,
            queues: RwLock::new(HashMap::new()),
        })
    }

    /// Creates an empty queue that reports nowhere.
    pub fn without_metrics() -> Self {
        Self::new(Arc::new(NoOpMetrics))
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &OutboxConfig {
        &self.config
    }

    /// Appends a message for its sender.
    ///
    /// If the sender already has queued messages, the new nonce must be
    /// exactly one greater than the largest present.
    pub fn enqueue(&self, msg: M, stamp: Stamp) -> OutboxResult<()> {
        let mut queues = self.queues.write();
        let sender = msg.sender().clone();
        let nonce = msg.nonce();

        let queue = queues.entry(sender.clone()).or_default();
        let pushed = queue.push(msg, stamp);
        let len = queue.len();

        if let Err(e) = pushed {
            // A rejected first push must not leave an empty queue behind.
            if len == 0 {
                queues.remove(&sender);
            }
            warn!("[qc-outbox] Rejected enqueue for {:?}: {}", sender, e);
            return Err(e);
        }

        self.observe_size(len);
        debug!(
            sender = ?sender,
            nonce,
            stamp,
            queued = len,
            "[qc-outbox] Enqueued message"
        );
        Ok(())
    }

    /// Removes and returns the sender's head if it bears `expected_nonce`.
    ///
    /// Returns `Ok(None)` if the queue is empty or `expected_nonce` is below
    /// every queued nonce (the message was already removed).
    ///
    /// # Errors
    /// - `OutOfOrderRemoval` if `expected_nonce` is greater than the head's
    pub fn remove_next(&self, sender: &M::Sender, expected_nonce: Nonce) -> OutboxResult<Option<M>> {
        let mut queues = self.queues.write();

        let Some(queue) = queues.get_mut(sender) else {
            self.observe_size(0);
            return Ok(None);
        };

        let removed = match queue.remove_next(expected_nonce) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("[qc-outbox] {}", e);
                return Err(e);
            }
        };

        let len = queue.len();
        if len == 0 {
            queues.remove(sender);
        }
        self.observe_size(len);

        if removed.is_some() {
            debug!(
                sender = ?sender,
                nonce = expected_nonce,
                queued = len,
                "[qc-outbox] Removed confirmed message"
            );
        }
        Ok(removed)
    }

    /// Removes all messages for a sender.
    ///
    /// Returns whether the queue was non-empty before being cleared.
    pub fn clear(&self, sender: &M::Sender) -> bool {
        let mut queues = self.queues.write();
        let removed = queues.remove(sender);
        self.observe_size(0);

        match removed {
            Some(queue) => {
                debug!(sender = ?sender, dropped = queue.len(), "[qc-outbox] Cleared queue");
                !queue.is_empty()
            }
            None => false,
        }
    }

    /// Clears the queue of every sender whose head was stamped before `stamp`.
    ///
    /// Only the head stamp is compared: once the oldest message is stale the
    /// whole backlog goes, whatever the stamps behind it. Returns the expired
    /// messages per sender, oldest first.
    pub fn expire_before(&self, stamp: Stamp) -> HashMap<M::Sender, Vec<M>> {
        let mut queues = self.queues.write();

        let stale: Vec<M::Sender> = queues
            .iter()
            .filter(|(_, queue)| queue.is_stale(stamp))
            .map(|(sender, _)| sender.clone())
            .collect();

        let mut expired = HashMap::with_capacity(stale.len());
        let mut total = 0usize;
        for sender in stale {
            let Some(queue) = queues.remove(&sender) else {
                continue;
            };
            let count = queue.len();
            total += count;
            self.metrics
                .increment_counter(&self.config.expire_counter_name, count as u64);
            self.observe_size(0);
            debug!(sender = ?sender, count, "[qc-outbox] Expired queue");
            expired.insert(sender, queue.into_messages());
        }

        if !expired.is_empty() {
            info!(
                threshold = stamp,
                senders = expired.len(),
                messages = total,
                "[qc-outbox] Expired stale messages"
            );
        }
        expired
    }

    /// Largest nonce queued for a sender, or `None` if nothing is queued.
    pub fn largest_nonce(&self, sender: &M::Sender) -> Option<Nonce> {
        self.queues
            .read()
            .get(sender)
            .and_then(SenderQueue::largest_nonce)
    }

    /// Nonce the sender's next message must carry to be accepted behind the
    /// queued ones. `Ok(None)` if nothing is queued.
    ///
    /// # Errors
    /// - `NonceOverflow` if the largest queued nonce is `u64::MAX`
    pub fn next_nonce(&self, sender: &M::Sender) -> OutboxResult<Option<Nonce>> {
        match self.largest_nonce(sender) {
            None => Ok(None),
            Some(largest) => largest
                .checked_add(1)
                .map(Some)
                .ok_or(OutboxError::NonceOverflow { nonce: largest }),
        }
    }

    /// Senders with a non-empty queue. Order is neither defined nor stable.
    pub fn queues(&self) -> Vec<M::Sender> {
        self.queues.read().keys().cloned().collect()
    }

    /// Copy of the messages queued for a sender, oldest first.
    pub fn list(&self, sender: &M::Sender) -> Vec<QueuedMessage<M>> {
        self.queues
            .read()
            .get(sender)
            .map(SenderQueue::snapshot)
            .unwrap_or_default()
    }

    /// Number of messages queued for a sender.
    pub fn len(&self, sender: &M::Sender) -> usize {
        self.queues.read().get(sender).map_or(0, SenderQueue::len)
    }

    /// Number of messages queued across all senders.
    pub fn total_len(&self) -> usize {
        self.queues.read().values().map(SenderQueue::len).sum()
    }

    /// Returns true if no sender has anything queued.
    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }

    /// Gets the current queue status.
    pub fn status(&self) -> QueueStatus {
        let queues = self.queues.read();
        QueueStatus {
            sender_count: queues.len(),
            message_count: queues.values().map(SenderQueue::len).sum(),
        }
    }

    fn observe_size(&self, len: usize) {
        self.metrics.observe_gauge(
            &self.config.size_gauge_name,
            i64::try_from(len).unwrap_or(i64::MAX),
        );
    }
}

impl<M: OutboundMessage> std::fmt::Debug for MessageQueue<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageQueue")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish()
    }
}

impl<M> MessageQueueApi<M> for MessageQueue<M>
where
    M: OutboundMessage + Send + Sync,
    M::Sender: Send + Sync,
{
    fn enqueue(&self, msg: M, stamp: Stamp) -> OutboxResult<()> {
        MessageQueue::enqueue(self, msg, stamp)
    }

    fn remove_next(&self, sender: &M::Sender, expected_nonce: Nonce) -> OutboxResult<Option<M>> {
        MessageQueue::remove_next(self, sender, expected_nonce)
    }

    fn clear(&self, sender: &M::Sender) -> bool {
        MessageQueue::clear(self, sender)
    }

    fn expire_before(&self, stamp: Stamp) -> HashMap<M::Sender, Vec<M>> {
        MessageQueue::expire_before(self, stamp)
    }

    fn largest_nonce(&self, sender: &M::Sender) -> Option<Nonce> {
        MessageQueue::largest_nonce(self, sender)
    }

    fn queues(&self) -> Vec<M::Sender> {
        MessageQueue::queues(self)
    }

    fn list(&self, sender: &M::Sender) -> Vec<QueuedMessage<M>> {
        MessageQueue::list(self, sender)
    }

    fn status(&self) -> QueueStatus {
        MessageQueue::status(self)
    }
}
