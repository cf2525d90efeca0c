//! # Ports Layer
//!
//! Hexagonal architecture ports for the finality tracker.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
