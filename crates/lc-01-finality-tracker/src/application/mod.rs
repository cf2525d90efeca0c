//! # Application Layer
//!
//! The finality tracker service.

pub mod service;

pub use service::{FinalityTracker, SubmissionStats};
