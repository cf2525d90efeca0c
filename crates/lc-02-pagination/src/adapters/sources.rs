//! Page Sources
//!
//! The two [`PageSource`] strategies: the indexer grouping path and the
//! direct ledger fallback.

use crate::algorithms::{group_records, group_rows, next_offset, slice_keys, sort_keys};
use crate::domain::{KeyGroup, PaginationError, QueryDescriptor, Record, ResultPage};
use crate::ports::{IndexerPort, LedgerEnumerator, PageSource};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Derives the grouping key of a ledger record.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Indexer grouping path.
///
/// 1. Key set: explicit targets, or the grouping query.
/// 2. Sort and deduplicate.
/// 3. Slice `[start, start + size)`.
/// 4. Detail query restricted to the slice plus the original filters.
pub struct IndexerPageSource<T: Record> {
    indexer: Arc<dyn IndexerPort<T>>,
}

impl<T: Record> IndexerPageSource<T> {
    /// Wrap an indexer.
    pub fn new(indexer: Arc<dyn IndexerPort<T>>) -> Self {
        Self { indexer }
    }
}

#[async_trait]
impl<T: Record> PageSource<T> for IndexerPageSource<T> {
    fn name(&self) -> &'static str {
        "indexer"
    }

    async fn is_available(&self) -> bool {
        self.indexer.supports_grouping() && self.indexer.is_available().await
    }

    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        size: usize,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError> {
        let filters = &descriptor.filters;
        let keys = match &filters.targets {
            Some(targets) => targets.clone(),
            None => self.indexer.group_keys(filters).await?,
        };
        let keys = sort_keys(keys);
        let count = keys.len();

        let slice = slice_keys(&keys, descriptor.start, size);
        if slice.is_empty() {
            debug!(
                start = descriptor.start,
                count, "[lc-02] Page starts past the key set"
            );
            return Ok(ResultPage::empty(count));
        }

        let rows = self.indexer.fetch_detail(slice, filters).await?;
        let data = group_rows(slice, rows);
        let next = next_offset(descriptor.start, size, data.len(), count);

        debug!(
            start = descriptor.start,
            size,
            returned = data.len(),
            count,
            next = ?next,
            "[lc-02] Indexer page resolved"
        );
        Ok(ResultPage { data, next, count })
    }
}

/// Direct ledger fallback.
///
/// Needs explicit targets. Returns every group in one page, sorted by key.
pub struct LedgerPageSource<T: Record> {
    ledger: Arc<dyn LedgerEnumerator<T>>,
    key_fn: KeyFn<T>,
}

impl<T: Record> LedgerPageSource<T> {
    /// Wrap a ledger enumerator, grouping records by `key_fn`.
    pub fn new<F>(ledger: Arc<dyn LedgerEnumerator<T>>, key_fn: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            ledger,
            key_fn: Arc::new(key_fn),
        }
    }
}

#[async_trait]
impl<T: Record> PageSource<T> for LedgerPageSource<T> {
    fn name(&self) -> &'static str {
        "ledger"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        _size: usize,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError> {
        let Some(targets) = descriptor.filters.targets.as_ref() else {
            return Err(PaginationError::IndexerRequired(
                "ledger enumeration needs explicit targets".to_string(),
            ));
        };
        let targets = sort_keys(targets.clone());

        let records = self.ledger.enumerate(&targets, &descriptor.filters).await?;
        let key_fn = self.key_fn.as_ref();
        let data = group_records(records, |record| key_fn(record));
        let count = data.len();

        debug!(
            targets = targets.len(),
            groups = count,
            "[lc-02] Ledger page resolved"
        );
        Ok(ResultPage {
            data,
            next: None,
            count,
        })
    }
}
