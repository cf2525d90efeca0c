//! # Pagination Errors

use thiserror::Error;

/// Pagination error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// The indexing service cannot answer right now.
    #[error("Indexer unavailable: {0}")]
    IndexerUnavailable(String),

    /// The query can only be answered by the indexer, and it is unavailable.
    #[error("Indexer required: {0}")]
    IndexerRequired(String),

    /// Requested page size is zero.
    #[error("Invalid page size {size} (pages hold 1 to {max} entries)")]
    InvalidPageSize {
        /// Requested size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// The indexer answered with an error.
    #[error("Indexer query failed: {0}")]
    Backend(String),

    /// Direct ledger enumeration failed.
    #[error("Ledger enumeration failed: {0}")]
    Ledger(String),
}

impl PaginationError {
    /// Whether a fallback source may answer instead.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::IndexerUnavailable(_))
    }
}
