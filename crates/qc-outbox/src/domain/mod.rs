//! # Domain Layer - Outbox Subsystem
//!
//! Pure queue logic with no locking and no I/O.
//!
//! ## Components
//!
//! - `entities`: OutboundMessage trait, QueuedMessage, Nonce/Stamp aliases
//! - `queue`: SenderQueue enforcing contiguity and head-only removal
//! - `invariants`: Nonce continuation and staleness rules
//! - `config`: OutboxConfig (metric names)
//! - `value_objects`: QueueStatus
//! - `errors`: OutboxError enumeration

pub mod config;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod queue;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use queue::*;
pub use value_objects::*;
