//! # Domain Invariants
//!
//! Business rules for the outbox queue.

use super::entities::{Nonce, OutboundMessage, QueuedMessage, Stamp};
use super::errors::OutboxError;

/// Invariant: nonce continuation.
///
/// A message appended behind `last` must carry exactly `last + 1`.
pub fn invariant_next_nonce(last: Nonce, actual: Nonce) -> Result<(), OutboxError> {
    let expected = last
        .checked_add(1)
        .ok_or(OutboxError::NonceOverflow { nonce: last })?;
    if actual != expected {
        return Err(OutboxError::InvalidNonce { actual, expected });
    }
    Ok(())
}

/// Invariant: gap-free sequence.
///
/// Every adjacent pair satisfies `next.nonce == prev.nonce + 1`.
pub fn invariant_contiguous<'a, M, I>(entries: I) -> bool
where
    M: OutboundMessage + 'a,
    I: IntoIterator<Item = &'a QueuedMessage<M>>,
{
    let mut prev: Option<Nonce> = None;
    for entry in entries {
        let nonce = entry.nonce();
        if let Some(p) = prev {
            if p.checked_add(1) != Some(nonce) {
                return false;
            }
        }
        prev = Some(nonce);
    }
    true
}

/// Invariant: staleness is decided by the head alone.
///
/// Interior stamps are unordered and never consulted.
pub fn invariant_head_is_stale(head_stamp: Stamp, threshold: Stamp) -> bool {
    head_stamp < threshold
}
