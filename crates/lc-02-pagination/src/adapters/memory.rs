//! In-Memory Backends
//!
//! `IndexerPort` and `LedgerEnumerator` over plain row vectors. The indexer
//! returns grouping keys in hash order, like a backend that makes no
//! ordering promise.

use crate::domain::{IndexedRow, PaginationError, QueryFilters, Record};
use crate::ports::{IndexerPort, LedgerEnumerator};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn targeted<T>(row: &IndexedRow<T>, filters: &QueryFilters) -> bool {
    filters
        .targets
        .as_ref()
        .map_or(true, |targets| targets.contains(&row.key))
        && filters.matches(&row.attributes)
}

/// In-memory indexing service.
pub struct InMemoryIndexer<T> {
    rows: RwLock<Vec<IndexedRow<T>>>,
    available: AtomicBool,
    grouping: bool,
    group_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl<T: Record> InMemoryIndexer<T> {
    /// Indexer over `rows`, available and grouping-capable.
    pub fn new(rows: Vec<IndexedRow<T>>) -> Self {
        Self {
            rows: RwLock::new(rows),
            available: AtomicBool::new(true),
            grouping: true,
            group_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Disable the grouping query.
    pub fn without_grouping(mut self) -> Self {
        self.grouping = false;
        self
    }

    /// Toggle availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Index one more row.
    pub fn insert(&self, row: IndexedRow<T>) {
        self.rows.write().push(row);
    }

    /// Grouping queries served.
    pub fn group_calls(&self) -> usize {
        self.group_calls.load(Ordering::SeqCst)
    }

    /// Detail queries served.
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), PaginationError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PaginationError::IndexerUnavailable(
                "in-memory indexer offline".to_string(),
            ))
        }
    }
}

#[async_trait]
impl<T: Record> IndexerPort<T> for InMemoryIndexer<T> {
    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn supports_grouping(&self) -> bool {
        self.grouping
    }

    async fn group_keys(&self, filters: &QueryFilters) -> Result<Vec<String>, PaginationError> {
        self.ensure_available()?;
        if !self.grouping {
            return Err(PaginationError::Backend(
                "grouping query not supported".to_string(),
            ));
        }
        self.group_calls.fetch_add(1, Ordering::SeqCst);

        let keys: HashSet<String> = self
            .rows
            .read()
            .iter()
            .filter(|row| targeted(row, filters))
            .map(|row| row.key.clone())
            .collect();
        Ok(keys.into_iter().collect())
    }

    async fn fetch_detail(
        &self,
        keys: &[String],
        filters: &QueryFilters,
    ) -> Result<Vec<IndexedRow<T>>, PaginationError> {
        self.ensure_available()?;
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| keys.contains(&row.key) && filters.matches(&row.attributes))
            .cloned()
            .collect())
    }

    async fn fetch_history(
        &self,
        filters: &QueryFilters,
        start: usize,
        size: usize,
    ) -> Result<(Vec<IndexedRow<T>>, usize), PaginationError> {
        self.ensure_available()?;

        let rows = self.rows.read();
        let matching: Vec<&IndexedRow<T>> =
            rows.iter().filter(|row| targeted(row, filters)).collect();
        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(start)
            .take(size)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

/// In-memory ledger. Rows are keyed by owning target.
pub struct InMemoryLedger<T> {
    records: RwLock<Vec<IndexedRow<T>>>,
    enumerations: AtomicUsize,
}

impl<T: Record> InMemoryLedger<T> {
    /// Ledger holding `records`.
    pub fn new(records: Vec<IndexedRow<T>>) -> Self {
        Self {
            records: RwLock::new(records),
            enumerations: AtomicUsize::new(0),
        }
    }

    /// Store one more record.
    pub fn insert(&self, record: IndexedRow<T>) {
        self.records.write().push(record);
    }

    /// Enumerations served.
    pub fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Record> LedgerEnumerator<T> for InMemoryLedger<T> {
    async fn enumerate(
        &self,
        targets: &[String],
        filters: &QueryFilters,
    ) -> Result<Vec<T>, PaginationError> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| targets.contains(&r.key) && filters.matches(&r.attributes))
            .map(|r| r.value.clone())
            .collect())
    }
}
