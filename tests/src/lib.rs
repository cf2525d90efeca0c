//! # Ledger Client Test Suite
//!
//! Cross-crate flows that exercise the trackers and resolvers against the
//! in-process adapters.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── submission_flows.rs   # FinalityTracker against SimulatedNode / ScriptedTransport
//!     └── pagination_flows.rs   # PaginationResolver against InMemoryIndexer / InMemoryLedger
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lc-tests
//! cargo test -p lc-tests integration::submission_flows::
//! ```

#![allow(dead_code)]

pub mod integration;
