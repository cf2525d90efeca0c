//! # Pagination Configuration

use crate::domain::PaginationError;
use serde::{Deserialize, Serialize};

/// Default page size when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Largest page served; bigger requests are clamped to it.
pub const MAX_PAGE_SIZE: usize = 100;

/// Pagination resolver configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the descriptor has none.
    pub default_page_size: usize,
    /// Upper bound for the served page size.
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PaginationConfig {
    /// Create a config for testing (small pages).
    pub fn for_testing() -> Self {
        Self {
            default_page_size: 2,
            max_page_size: 10,
        }
    }

    /// Effective page size for a requested one.
    ///
    /// Zero is rejected. Sizes above `max_page_size` are clamped.
    pub fn page_size(&self, requested: Option<usize>) -> Result<usize, PaginationError> {
        let size = requested.unwrap_or(self.default_page_size);
        if size == 0 {
            return Err(PaginationError::InvalidPageSize {
                size,
                max: self.max_page_size,
            });
        }
        Ok(size.min(self.max_page_size))
    }
}
