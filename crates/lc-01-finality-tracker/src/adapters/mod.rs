//! # Adapters
//!
//! In-process implementations of the outbound ports.

pub mod simulated_node;

pub use simulated_node::SimulatedNode;
