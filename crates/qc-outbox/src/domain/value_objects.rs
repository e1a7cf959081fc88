//! Value objects for the Outbox subsystem.

use serde::{Deserialize, Serialize};

/// Point-in-time summary of the queue store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Senders holding at least one message.
    pub sender_count: usize,
    /// Messages across all senders.
    pub message_count: usize,
}

impl QueueStatus {
    /// Returns true if no message is pending.
    pub fn is_empty(&self) -> bool {
        self.message_count == 0
    }
}
