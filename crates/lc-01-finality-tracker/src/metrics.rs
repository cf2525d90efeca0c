//! # Submission Metrics
//!
//! Prometheus metrics for transaction submissions.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! lc-01-finality-tracker = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `submissions_total` - Counter of resolved submissions (by outcome)
//! - `submission_polling_attempts_total` - Counter of finalized head checks
//! - `submission_unsubscribe_failures_total` - Counter of failed unsubscriptions

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Resolved submissions, labeled by outcome
    pub static ref SUBMISSIONS: IntCounterVec = register_int_counter_vec!(
        "submissions_total",
        "Total number of resolved submissions",
        &["outcome"]
    )
    .expect("Failed to create SUBMISSIONS metric");

    /// Finalized head checks performed in polling mode
    pub static ref POLLING_ATTEMPTS: IntCounter = register_int_counter!(
        "submission_polling_attempts_total",
        "Total number of finalized head checks"
    )
    .expect("Failed to create POLLING_ATTEMPTS metric");

    /// Unsubscribe calls that failed
    pub static ref UNSUBSCRIBE_FAILURES: IntCounter = register_int_counter!(
        "submission_unsubscribe_failures_total",
        "Total number of failed unsubscriptions"
    )
    .expect("Failed to create UNSUBSCRIBE_FAILURES metric");
}

/// Record a resolved submission (`finalized`, `rejected`, `transport`, ...)
#[cfg(feature = "metrics")]
pub fn record_submission(outcome: &str) {
    SUBMISSIONS.with_label_values(&[outcome]).inc();
}

/// Record one polling attempt
#[cfg(feature = "metrics")]
pub fn record_polling_attempt() {
    POLLING_ATTEMPTS.inc();
}

/// Record a failed unsubscription
#[cfg(feature = "metrics")]
pub fn record_unsubscribe_failure() {
    UNSUBSCRIBE_FAILURES.inc();
}

/// Record a resolved submission (`finalized`, `rejected`, `transport`, ...)
#[cfg(not(feature = "metrics"))]
pub fn record_submission(_outcome: &str) {}

/// Record one polling attempt
#[cfg(not(feature = "metrics"))]
pub fn record_polling_attempt() {}

/// Record a failed unsubscription
#[cfg(not(feature = "metrics"))]
pub fn record_unsubscribe_failure() {}
