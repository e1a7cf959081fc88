//! # Domain Errors
//!
//! Error types for the Outbox subsystem.
//!
//! "Nothing to remove" is not an error: `remove_next` reports it as `Ok(None)`.

use super::entities::Nonce;
use thiserror::Error;

/// Outbox error type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OutboxError {
    /// Enqueued nonce does not continue the sender's sequence.
    #[error("Invalid nonce {actual}, expected {expected}")]
    InvalidNonce {
        /// Nonce carried by the rejected message
        actual: Nonce,
        /// Nonce that would have continued the sequence
        expected: Nonce,
    },

    /// The sender's last queued nonce is `u64::MAX`; nothing can follow it.
    #[error("Nonce sequence exhausted after {nonce}")]
    NonceOverflow {
        /// Last queued nonce
        nonce: Nonce,
    },

    /// Removal asked to skip a message that is still at the head.
    #[error("Next message for {sender} has nonce {head}, expected {expected}")]
    OutOfOrderRemoval {
        /// Debug rendering of the sender identity
        sender: String,
        /// Nonce currently at the head of the queue
        head: Nonce,
        /// Nonce the caller tried to remove
        expected: Nonce,
    },

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics could not be encoded for export.
    #[error("Failed to encode metrics: {0}")]
    MetricsExport(String),
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
