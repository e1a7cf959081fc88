//! Ports layer for the Outbox subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to producers and confirmation watchers
//! - Outbound (Driven) ports: Metrics reporting

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
