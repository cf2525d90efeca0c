//! # Pagination Resolver Service
//!
//! Routes a paginated query to the primary page source (normally the
//! indexer) and falls back to the secondary one (normally the ledger) when
//! the primary is unavailable.

use crate::algorithms::next_offset;
use crate::config::PaginationConfig;
use crate::domain::{
    IndexedRow, KeyGroup, PaginationError, QueryDescriptor, QueryFilters, Record, ResultPage,
};
use crate::metrics;
use crate::ports::{IndexerPort, PageSource, PaginationApi};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters across all queries handled by one resolver.
#[derive(Debug, Default)]
pub struct PaginationStats {
    /// Pages answered by the primary source
    pub primary_pages: AtomicU64,
    /// Pages answered by the fallback source
    pub fallback_pages: AtomicU64,
    /// Times the primary was skipped or failed over
    pub fallbacks: AtomicU64,
    /// Offset listings answered by the indexer
    pub history_pages: AtomicU64,
}

/// Pagination resolver.
pub struct PaginationResolver<T: Record> {
    config: PaginationConfig,
    primary: Arc<dyn PageSource<T>>,
    fallback: Option<Arc<dyn PageSource<T>>>,
    history: Option<Arc<dyn IndexerPort<T>>>,
    stats: Arc<PaginationStats>,
}

impl<T: Record> PaginationResolver<T> {
    /// Resolver over a single page source.
    pub fn new(config: PaginationConfig, primary: Arc<dyn PageSource<T>>) -> Self {
        Self {
            config,
            primary,
            fallback: None,
            history: None,
            stats: Arc::new(PaginationStats::default()),
        }
    }

    /// Source used when the primary is unavailable.
    pub fn with_fallback(mut self, fallback: Arc<dyn PageSource<T>>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Indexer answering offset listings.
    pub fn with_history(mut self, indexer: Arc<dyn IndexerPort<T>>) -> Self {
        self.history = Some(indexer);
        self
    }

    /// Resolver configuration.
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<PaginationStats> {
        self.stats.clone()
    }

    /// Resolve one page of key groups.
    pub async fn resolve_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError> {
        let size = self.config.page_size(descriptor.size)?;

        let reason = if self.primary.is_available().await {
            match self.primary.fetch_page(descriptor, size).await {
                Ok(page) => {
                    self.stats.primary_pages.fetch_add(1, Ordering::Relaxed);
                    metrics::record_page(self.primary.name());
                    return Ok(page);
                }
                Err(e) if e.allows_fallback() => e.to_string(),
                Err(e) => return Err(e),
            }
        } else {
            format!("{} unavailable", self.primary.name())
        };

        let fallback = match &self.fallback {
            Some(fallback) => fallback,
            None => {
                return Err(PaginationError::IndexerRequired(format!(
                    "no fallback for query ({})",
                    reason
                )))
            }
        };
        if !fallback.is_available().await {
            return Err(PaginationError::IndexerRequired(format!(
                "{} unavailable as well ({})",
                fallback.name(),
                reason
            )));
        }

        self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
        metrics::record_fallback();
        warn!(
            primary = self.primary.name(),
            fallback = fallback.name(),
            reason = %reason,
            "[lc-02] Falling back to secondary page source"
        );

        let page = fallback.fetch_page(descriptor, size).await?;
        self.stats.fallback_pages.fetch_add(1, Ordering::Relaxed);
        metrics::record_page(fallback.name());
        Ok(page)
    }

    /// Follow `next` from offset 0 until exhaustion.
    pub async fn resolve_all(
        &self,
        filters: &QueryFilters,
        size: Option<usize>,
    ) -> Result<Vec<KeyGroup<T>>, PaginationError> {
        let mut descriptor = QueryDescriptor {
            filters: filters.clone(),
            size,
            start: 0,
        };
        let mut groups = Vec::new();

        loop {
            let page = self.resolve_page(&descriptor).await?;
            groups.extend(page.data);
            match page.next {
                Some(next) if next > descriptor.start => descriptor.start = next,
                Some(next) => {
                    warn!(
                        start = descriptor.start,
                        next, "[lc-02] Cursor did not advance; stopping"
                    );
                    break;
                }
                None => break,
            }
        }

        debug!(groups = groups.len(), "[lc-02] Listing exhausted");
        Ok(groups)
    }

    /// Offset listing served only by the indexer.
    pub async fn resolve_history_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<IndexedRow<T>>, PaginationError> {
        let size = self.config.page_size(descriptor.size)?;

        let Some(indexer) = &self.history else {
            return Err(PaginationError::IndexerRequired(
                "history listing needs an indexer".to_string(),
            ));
        };
        if !indexer.is_available().await {
            return Err(PaginationError::IndexerRequired(
                "history listing needs the indexer, which is unavailable".to_string(),
            ));
        }

        let (data, count) = match indexer
            .fetch_history(&descriptor.filters, descriptor.start, size)
            .await
        {
            Ok(found) => found,
            Err(PaginationError::IndexerUnavailable(reason)) => {
                return Err(PaginationError::IndexerRequired(reason))
            }
            Err(e) => return Err(e),
        };

        let next = next_offset(descriptor.start, size, data.len(), count);
        self.stats.history_pages.fetch_add(1, Ordering::Relaxed);
        metrics::record_page("history");
        Ok(ResultPage { data, next, count })
    }
}

#[async_trait]
impl<T: Record> PaginationApi<T> for PaginationResolver<T> {
    async fn resolve_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<KeyGroup<T>>, PaginationError> {
        PaginationResolver::resolve_page(self, descriptor).await
    }

    async fn resolve_all(
        &self,
        filters: &QueryFilters,
        size: Option<usize>,
    ) -> Result<Vec<KeyGroup<T>>, PaginationError> {
        PaginationResolver::resolve_all(self, filters, size).await
    }

    async fn resolve_history_page(
        &self,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultPage<IndexedRow<T>>, PaginationError> {
        PaginationResolver::resolve_history_page(self, descriptor).await
    }
}
