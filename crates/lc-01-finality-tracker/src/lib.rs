//! # lc-01-finality-tracker
//!
//! Submits a signed transaction to a ledger node and determines its final
//! outcome: finalized, rejected on chain, or lost in the transport.
//!
//! ## Overview
//!
//! - **Subscription tracking**: status callbacks drive a lifecycle state machine
//! - **Polling tracking**: bounded walk of newly finalized blocks
//! - **Failure classification**: `system.ExtrinsicFailed` at the submitted index
//! - **Single resolution**: duplicate or late updates never resolve twice
//!
//! ## Architecture
//!
//! ```text
//! caller ──SignedPayload──→ FinalityTracker ──submit_and_watch / submit──→ TransportPort
//!                               │    ↑
//!                               │    └── StatusUpdate (push) / finalized head + blocks (poll)
//!                               ├── next_state (pure)
//!                               └── classify_failure (pure)
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! [Submitted] ──InBlock──→ [IncludedInBlock] ──Finalized──→ [Finalized]
//!      │                         │
//!      │                         └──ExtrinsicFailed──→ [RejectedOnChain]
//!      └──Dropped / Invalid / Usurped / Error──→ [TransportError]
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use lc_01_finality_tracker::{FinalityTracker, TrackerConfig, SimulatedNode};
//!
//! let node = Arc::new(SimulatedNode::subscription());
//! let tracker = FinalityTracker::new(node, TrackerConfig::default());
//!
//! match tracker.submit(payload).await {
//!     Ok(outcome) => println!("final in {:?} at {}", outcome.block_hash, outcome.tx_index),
//!     Err(SubmissionError::RejectedOnChain { error, .. }) => println!("rejected: {error}"),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

pub use adapters::SimulatedNode;
pub use algorithms::{
    classify_failure, classify_failure_with, decode_dispatch_error, next_state, ErrorMetadata,
    NoErrorMetadata, StaticErrorMetadata, Step,
};
pub use application::{FinalityTracker, SubmissionStats};
pub use config::TrackerConfig;
pub use domain::*;
pub use ports::{
    LifecycleObserver, RecordingObserver, ScriptedTransport, StatusCallback, SubmissionApi,
    SubscriptionHandle, TransportPort,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
