//! Core domain entities for the Outbox subsystem.
//!
//! The queue never owns message identity or signatures. It only needs a
//! sender key and a nonce, which it reads through [`OutboundMessage`].

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Sender-scoped sequence number.
pub type Nonce = u64;

/// Opaque value attached at enqueue time (typically a block height).
pub type Stamp = u64;

/// A transmitted message the outbox can track.
///
/// Implemented by the host's signed message type. The queue reads the sender
/// and nonce and never looks at anything else.
pub trait OutboundMessage: Clone {
    /// Identity partitioning the queue store.
    type Sender: Clone + Eq + Hash + Debug;

    /// Sender of this message.
    fn sender(&self) -> &Self::Sender;

    /// Sender-scoped nonce of this message.
    fn nonce(&self) -> Nonce;
}

impl<M: OutboundMessage> OutboundMessage for Arc<M> {
    type Sender = M::Sender;

    fn sender(&self) -> &Self::Sender {
        (**self).sender()
    }

    fn nonce(&self) -> Nonce {
        (**self).nonce()
    }
}

/// A message and the stamp it was enqueued with.
///
/// Immutable once created: queues append or remove whole entries and never
/// edit one in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedMessage<M> {
    msg: M,
    stamp: Stamp,
}

impl<M: OutboundMessage> QueuedMessage<M> {
    /// Pairs a message with its enqueue stamp.
    pub fn new(msg: M, stamp: Stamp) -> Self {
        Self { msg, stamp }
    }

    /// The queued message.
    pub fn message(&self) -> &M {
        &self.msg
    }

    /// Stamp supplied when the message was enqueued.
    pub fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Shorthand for `self.message().nonce()`.
    pub fn nonce(&self) -> Nonce {
        self.msg.nonce()
    }

    /// Consumes the entry, returning the message.
    pub fn into_message(self) -> M {
        self.msg
    }
}
