//! Service layer: the lock-guarded outbox exposed to the rest of the node.

pub mod message_queue;

pub use message_queue::MessageQueue;
