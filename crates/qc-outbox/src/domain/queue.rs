//! # Sender Queue
//!
//! Nonce-ordered sequence of queued messages for a single sender.
//!
//! ## Invariants Enforced
//!
//! - Contiguity: adjacent nonces differ by exactly one (checked in `push()`)
//! - Head-only removal: `remove_next()` never skips the head
//! - Wholesale expiry: `is_stale()` looks at the head stamp only
//!
//! `SenderQueue` holds no lock. The service wraps the whole store in one.

use super::entities::{Nonce, OutboundMessage, QueuedMessage, Stamp};
use super::errors::{OutboxError, OutboxResult};
use super::invariants::{invariant_contiguous, invariant_head_is_stale, invariant_next_nonce};
use std::collections::VecDeque;

/// Queued messages of one sender, in nonce order.
#[derive(Clone, Debug)]
pub struct SenderQueue<M> {
    entries: VecDeque<QueuedMessage<M>>,
}

impl<M: OutboundMessage> Default for SenderQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: OutboundMessage> SenderQueue<M> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest entry, the only one `remove_next` can take.
    pub fn head(&self) -> Option<&QueuedMessage<M>> {
        self.entries.front()
    }

    /// Newest entry.
    pub fn tail(&self) -> Option<&QueuedMessage<M>> {
        self.entries.back()
    }

    /// Nonce of the newest entry.
    pub fn largest_nonce(&self) -> Option<Nonce> {
        self.tail().map(QueuedMessage::nonce)
    }

    /// Appends a message.
    ///
    /// An empty queue accepts any nonce. Otherwise the nonce must be exactly
    /// one past the tail's.
    ///
    /// # Errors
    /// - `InvalidNonce` if the nonce does not continue the sequence
    /// - `NonceOverflow` if the tail nonce is `u64::MAX`
    pub fn push(&mut self, msg: M, stamp: Stamp) -> OutboxResult<()> {
        if let Some(last) = self.largest_nonce() {
            invariant_next_nonce(last, msg.nonce())?;
        }
        self.entries.push_back(QueuedMessage::new(msg, stamp));
        debug_assert!(invariant_contiguous(&self.entries));
        Ok(())
    }

    /// Pops the head if it carries `expected`.
    ///
    /// Returns `Ok(None)` when the queue is empty or `expected` is below the
    /// head (already removed earlier).
    ///
    /// # Errors
    /// - `OutOfOrderRemoval` if `expected` is beyond the head
    pub fn remove_next(&mut self, expected: Nonce) -> OutboxResult<Option<M>> {
        let Some(head) = self.entries.front() else {
            return Ok(None);
        };

        let head_nonce = head.nonce();
        if expected < head_nonce {
            return Ok(None);
        }
        if expected > head_nonce {
            return Err(OutboxError::OutOfOrderRemoval {
                sender: format!("{:?}", head.message().sender()),
                head: head_nonce,
                expected,
            });
        }

        Ok(self.entries.pop_front().map(QueuedMessage::into_message))
    }

    /// True if the head was stamped strictly before `threshold`.
    pub fn is_stale(&self, threshold: Stamp) -> bool {
        self.head()
            .is_some_and(|head| invariant_head_is_stale(head.stamp(), threshold))
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedMessage<M>> {
        self.entries.iter()
    }

    /// Owned copy of every entry, oldest first.
    pub fn snapshot(&self) -> Vec<QueuedMessage<M>> {
        self.entries.iter().cloned().collect()
    }

    /// Consumes the queue, returning messages oldest first.
    pub fn into_messages(self) -> Vec<M> {
        self.entries
            .into_iter()
            .map(QueuedMessage::into_message)
            .collect()
    }
}
