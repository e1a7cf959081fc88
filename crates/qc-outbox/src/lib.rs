//! # Outbox Message Queue
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)  
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Records outbound messages that have been transmitted but have not yet
//! appeared in a block. Each sender's pending messages must form a gap-free
//! nonce sequence. Each message carries a stamp (usually the block height at
//! enqueue time) that drives bulk expiry of stale backlogs.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Contiguous nonces per sender | `domain/queue.rs` - `push()` |
//! | INVARIANT-2 | Head-only removal | `domain/queue.rs` - `remove_next()` |
//! | INVARIANT-3 | No empty sender queues retained | `service/message_queue.rs` |
//! | INVARIANT-4 | Expiry decided by head stamp only | `domain/invariants.rs` |
//!
//! ## Message Lifecycle
//!
//! ```text
//! send ──enqueue──→ [QUEUED] ──remove_next──→ [CONFIRMED, dropped]
//!                      │
//!                      ├── expire_before ──→ [EXPIRED, returned to caller]
//!                      └── clear ──────────→ [DROPPED]
//! ```
//!
//! | Outcome | Method | Result |
//! |---------|--------|--------|
//! | Head confirmed | `remove_next(sender, head)` | `Ok(Some(msg))` |
//! | Already confirmed | `remove_next(sender, < head)` | `Ok(None)` |
//! | Skips the head | `remove_next(sender, > head)` | `Err(OutOfOrderRemoval)` |
//! | Broken sequence | `enqueue(msg)` | `Err(InvalidNonce)` |
//!
//! ## Concurrency
//!
//! One `parking_lot::RwLock` guards the whole store. Mutations take the write
//! lock, accessors the read lock. No background tasks: expiry is driven by
//! the caller.
//!
//! ## Module Structure
//!
//! ```text
//! qc-outbox/
//! ├── domain/     # OutboundMessage, QueuedMessage, SenderQueue, OutboxConfig, errors
//! ├── ports/      # MessageQueueApi (inbound), MetricsSink (outbound)
//! ├── adapters/   # NoOpMetrics, InMemoryMetrics, PrometheusMetrics
//! └── service/    # MessageQueue
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_outbox::{MessageQueue, PrometheusMetrics};
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(PrometheusMetrics::new("qc_outbox"));
//! let outbox = MessageQueue::new(metrics.clone());
//!
//! outbox.enqueue(signed_msg, current_height)?;
//!
//! // On each new block
//! for msg in &block.messages {
//!     outbox.remove_next(&msg.from, msg.nonce)?;
//! }
//! for (sender, dropped) in outbox.expire_before(block.height - 100) {
//!     tracing::warn!(?sender, count = dropped.len(), "messages never landed");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryMetrics, MetricsSnapshot, NoOpMetrics, PrometheusMetrics};
pub use domain::{
    invariant_contiguous, invariant_head_is_stale, invariant_next_nonce, Nonce, OutboundMessage,
    OutboxConfig, OutboxError, OutboxResult, QueueStatus, QueuedMessage, SenderQueue, Stamp,
};
pub use ports::{MessageQueueApi, MetricsSink};
pub use service::MessageQueue;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
