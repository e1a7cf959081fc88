//! # Inbound Port - MessageQueueApi
//!
//! Primary driving port exposing the outbox queue.
//!
//! | Method | Typical Caller |
//! |--------|----------------|
//! | `enqueue` | Message sender, right after transmission |
//! | `remove_next` | Block-inclusion watcher |
//! | `expire_before` | Periodic sweep (e.g. on each new block) |
//! | `clear` | Sender reset (e.g. nonce resynchronization) |

use crate::domain::{Nonce, OutboundMessage, OutboxResult, QueueStatus, QueuedMessage, Stamp};
use std::collections::HashMap;

/// Primary API for the Outbox subsystem.
///
/// # Example
///
/// ```rust,ignore
/// use qc_outbox::ports::MessageQueueApi;
///
/// fn on_sent(outbox: &impl MessageQueueApi<SignedMessage>, msg: SignedMessage, height: u64) {
///     outbox.enqueue(msg, height)?;
/// }
///
/// fn on_block(outbox: &impl MessageQueueApi<SignedMessage>, block: &Block) {
///     for msg in &block.messages {
///         if let Some(queued) = outbox.remove_next(&msg.from, msg.nonce)? {
///             assert_eq!(&queued, msg);
///         }
///     }
///     outbox.expire_before(block.height.saturating_sub(EXPIRY_BLOCKS));
/// }
/// ```
pub trait MessageQueueApi<M: OutboundMessage>: Send + Sync {
    /// Appends a message for its sender.
    ///
    /// # Errors
    /// - `InvalidNonce`: The sender has queued messages and the nonce is not
    ///   exactly one past the largest
    /// - `NonceOverflow`: The largest queued nonce is `u64::MAX`
    fn enqueue(&self, msg: M, stamp: Stamp) -> OutboxResult<()>;

    /// Removes and returns the sender's head if it carries `expected_nonce`.
    ///
    /// Returns `Ok(None)` if the queue is empty or `expected_nonce` is below
    /// the head (already removed). Matching is by nonce only; callers may want
    /// to compare the returned message with the one they expected.
    ///
    /// # Errors
    /// - `OutOfOrderRemoval`: `expected_nonce` is beyond the head
    fn remove_next(&self, sender: &M::Sender, expected_nonce: Nonce) -> OutboxResult<Option<M>>;

    /// Drops every message for a sender. Returns whether any were present.
    fn clear(&self, sender: &M::Sender) -> bool;

    /// Evicts every queue whose head was stamped strictly before `stamp`.
    ///
    /// Returns the evicted messages per sender, oldest first.
    fn expire_before(&self, stamp: Stamp) -> HashMap<M::Sender, Vec<M>>;

    /// Largest queued nonce for a sender.
    fn largest_nonce(&self, sender: &M::Sender) -> Option<Nonce>;

    /// Senders with at least one queued message. Order is unspecified.
    fn queues(&self) -> Vec<M::Sender>;

    /// Copy of a sender's queue, oldest first.
    fn list(&self, sender: &M::Sender) -> Vec<QueuedMessage<M>>;

    /// Gets the current queue status.
    fn status(&self) -> QueueStatus;
}
