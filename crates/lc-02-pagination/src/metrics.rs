//! # Pagination Metrics
//!
//! Enable with the `metrics` feature.
//!
//! - `pagination_pages_total` - Counter of resolved pages (by backend)
//! - `pagination_fallbacks_total` - Counter of indexer-to-ledger fallbacks

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Resolved pages, labeled by backend
    pub static ref PAGES: IntCounterVec = register_int_counter_vec!(
        "pagination_pages_total",
        "Total number of resolved pages",
        &["backend"]
    )
    .expect("Failed to create PAGES metric");

    /// Fallbacks from the indexer to the ledger
    pub static ref FALLBACKS: IntCounter = register_int_counter!(
        "pagination_fallbacks_total",
        "Total number of indexer fallbacks"
    )
    .expect("Failed to create FALLBACKS metric");
}

/// Record a resolved page
#[cfg(feature = "metrics")]
pub fn record_page(backend: &str) {
    PAGES.with_label_values(&[backend]).inc();
}

/// Record a fallback to the ledger
#[cfg(feature = "metrics")]
pub fn record_fallback() {
    FALLBACKS.inc();
}

/// Record a resolved page
#[cfg(not(feature = "metrics"))]
pub fn record_page(_backend: &str) {}

/// Record a fallback to the ledger
#[cfg(not(feature = "metrics"))]
pub fn record_fallback() {}
