//! # Algorithms
//!
//! - `failure_classifier`: `ExtrinsicFailed` detection and dispatch error decoding
//! - `lifecycle`: pure state transition function
//! - `polling`: finalized block walk for request/response transports

pub mod failure_classifier;
pub mod lifecycle;
pub mod polling;

pub use failure_classifier::{
    classify_failure, classify_failure_with, decode_dispatch_error, ErrorMetadata,
    NoErrorMetadata, StaticErrorMetadata, EXTRINSIC_FAILED, SYSTEM_MODULE,
};
pub use lifecycle::{next_state, Step};
pub use polling::{fetch_new_blocks, locate_transaction};
