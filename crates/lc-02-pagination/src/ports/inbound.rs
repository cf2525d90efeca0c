//! Driving Ports (API - Inbound)

use crate::domain::{
    IndexedRow, KeyGroup, PaginationError, QueryDescriptor, QueryFilters, Record, ResultPage,
};
use async_trait::async_trait;

/// Paginated query API exposed to callers.
#[async_trait]
pub trait PaginationApi<T: Record>: Send + Sync {
    /// Resolve one page of key groups.
    async fn resolve_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError>;

    /// Follow `next` from offset 0 until exhaustion.
    async fn resolve_all(
        &self,
        filters: &QueryFilters,
        size: Option<usize>,
    ) -> Result<Vec<KeyGroup<T>>, PaginationError>;

    /// Offset listing of data only the indexer materializes.
    async fn resolve_history_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<IndexedRow<T>>, PaginationError>;
}
