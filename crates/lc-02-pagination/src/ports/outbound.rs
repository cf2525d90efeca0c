//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Backends the resolver reads from: the indexing service, direct ledger
//! enumeration, and the [`PageSource`] strategy both are wrapped in.

use crate::domain::{
    IndexedRow, KeyGroup, PaginationError, QueryDescriptor, QueryFilters, Record, ResultPage,
};
use async_trait::async_trait;

/// Secondary indexing service.
#[async_trait]
pub trait IndexerPort<T: Record>: Send + Sync {
    /// Availability probe.
    async fn is_available(&self) -> bool;

    /// Whether the grouping query is supported.
    fn supports_grouping(&self) -> bool;

    /// Distinct keys matching `filters`. Order is unspecified.
    async fn group_keys(&self, filters: &QueryFilters) -> Result<Vec<String>, PaginationError>;

    /// Rows under `keys` matching `filters`.
    async fn fetch_detail(
        &self,
        keys: &[String],
        filters: &QueryFilters,
    ) -> Result<Vec<IndexedRow<T>>, PaginationError>;

    /// Offset listing of rows matching `filters`, with the total match count.
    async fn fetch_history(
        &self,
        filters: &QueryFilters,
        start: usize,
        size: usize,
    ) -> Result<(Vec<IndexedRow<T>>, usize), PaginationError>;
}

/// Direct record enumeration against the ledger.
#[async_trait]
pub trait LedgerEnumerator<T: Record>: Send + Sync {
    /// Records owned by `targets` matching `filters`.
    async fn enumerate(
        &self,
        targets: &[String],
        filters: &QueryFilters,
    ) -> Result<Vec<T>, PaginationError>;
}

/// A backend able to answer a grouped page query.
#[async_trait]
pub trait PageSource<T: Record>: Send + Sync {
    /// Backend name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Whether the source can answer right now.
    async fn is_available(&self) -> bool;

    /// Fetch one page. `size` is already validated.
    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        size: usize,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError>;
}
