//! # Pagination Flows
//!
//! `PaginationResolver` over the in-memory indexer and ledger:
//!
//! 1. **Indexer path**: sorted key pages with a resolver-owned cursor
//! 2. **Fallback**: indexer outage served by direct ledger enumeration
//! 3. **Listings**: `resolve_all` and the indexer-only history page

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use lc_02_pagination::{
        IndexedRow, IndexerPageSource, InMemoryIndexer, InMemoryLedger, LedgerPageSource,
        PaginationApi, PaginationConfig, PaginationError, PaginationResolver, Predicate,
        QueryDescriptor, QueryFilters, ResultPage,
    };
    use lc_telemetry::{init_logging, TelemetryConfig};
    use std::sync::atomic::Ordering;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// (owner, amount) transfer, grouped by owner.
    type Transfer = (String, u64);

    fn setup() {
        let _ = init_logging(&TelemetryConfig::for_testing());
    }

    fn transfer(owner: &str, amount: u64, height: u64) -> IndexedRow<Transfer> {
        IndexedRow::new(owner, (owner.to_string(), amount))
            .with_attribute("height", height.to_string())
    }

    fn rows() -> Vec<IndexedRow<Transfer>> {
        vec![
            transfer("b", 20, 3),
            transfer("a", 10, 1),
            transfer("c", 30, 4),
            transfer("a", 11, 2),
        ]
    }

    struct Harness {
        indexer: Arc<InMemoryIndexer<Transfer>>,
        ledger: Arc<InMemoryLedger<Transfer>>,
        resolver: PaginationResolver<Transfer>,
    }

    fn harness(config: PaginationConfig) -> Harness {
        let indexer = Arc::new(InMemoryIndexer::new(rows()));
        let ledger = Arc::new(InMemoryLedger::new(rows()));
        let resolver = PaginationResolver::new(
            config,
            Arc::new(IndexerPageSource::new(indexer.clone())),
        )
        .with_fallback(Arc::new(LedgerPageSource::new(
            ledger.clone(),
            |t: &Transfer| t.0.clone(),
        )))
        .with_history(indexer.clone());

        Harness {
            indexer,
            ledger,
            resolver,
        }
    }

    fn keys<T>(page: &ResultPage<lc_02_pagination::KeyGroup<T>>) -> Vec<&str> {
        page.data.iter().map(|g| g.key.as_str()).collect()
    }

    // =============================================================================
    // INDEXER PATH
    // =============================================================================

    #[tokio::test]
    async fn test_first_page_of_unsorted_keys() {
        setup();
        let h = harness(PaginationConfig::default());

        let page = h
            .resolver
            .resolve_page(&QueryDescriptor::new(QueryFilters::default()).with_size(2))
            .await
            .unwrap();

        assert_eq!(keys(&page), vec!["a", "b"]);
        assert_eq!(page.next, Some(2));
        assert_eq!(page.count, 3);
        assert_eq!(page.data[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_following_next_reaches_last_page() {
        setup();
        let h = harness(PaginationConfig::default());
        let descriptor = QueryDescriptor::new(QueryFilters::default()).with_size(2);

        let first = h.resolver.resolve_page(&descriptor).await.unwrap();
        let second = h
            .resolver
            .resolve_page(&descriptor.clone().starting_at(first.next.unwrap()))
            .await
            .unwrap();

        assert_eq!(keys(&second), vec!["c"]);
        assert_eq!(second.next, None);
        assert_eq!(second.count, 3);
    }

    #[tokio::test]
    async fn test_predicates_narrow_both_queries() {
        setup();
        let h = harness(PaginationConfig::default());
        let filters = QueryFilters::default().with_predicate(Predicate::After {
            field: "height".to_string(),
            value: 1,
        });

        let page = h
            .resolver
            .resolve_page(&QueryDescriptor::new(filters))
            .await
            .unwrap();

        assert_eq!(keys(&page), vec!["a", "b", "c"]);
        assert_eq!(page.data[0].items, vec![("a".to_string(), 11)]);
        assert_eq!(page.next, None);
    }

    #[tokio::test]
    async fn test_page_size_larger_than_key_set() {
        setup();
        let h = harness(PaginationConfig::default());

        let page = h
            .resolver
            .resolve_page(&QueryDescriptor::new(QueryFilters::default()).with_size(500))
            .await
            .unwrap();
        assert_eq!(keys(&page), vec!["a", "b", "c"]);
        assert_eq!(page.next, None);
        assert_eq!(page.count, 3);

        let result = h
            .resolver
            .resolve_page(&QueryDescriptor::new(QueryFilters::default()).with_size(0))
            .await;
        assert!(matches!(
            result,
            Err(PaginationError::InvalidPageSize { size: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_oversized_pages_clamped_to_maximum() {
        setup();
        let h = harness(PaginationConfig::for_testing());
        for i in 0..12u64 {
            h.indexer.insert(transfer(&format!("k{i:02}"), i, 10 + i));
        }

        let page = h
            .resolver
            .resolve_page(&QueryDescriptor::new(QueryFilters::default()).with_size(500))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.count, 15);
        assert_eq!(page.next, Some(10));
    }

    // =============================================================================
    // FALLBACK
    // =============================================================================

    #[tokio::test]
    async fn test_outage_falls_back_to_ledger_for_targets() {
        setup();
        let h = harness(PaginationConfig::default());
        h.indexer.set_available(false);

        let descriptor =
            QueryDescriptor::new(QueryFilters::for_targets(["c", "a"])).with_size(1);
        let page = h.resolver.resolve_page(&descriptor).await.unwrap();

        assert_eq!(keys(&page), vec!["a", "c"]);
        assert_eq!(page.next, None);
        assert_eq!(page.count, 2);
        assert_eq!(h.ledger.enumerations(), 1);

        let stats = h.resolver.stats();
        assert_eq!(stats.fallback_pages.load(Ordering::Relaxed), 1);
        assert_eq!(stats.primary_pages.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_outage_without_targets_requires_indexer() {
        setup();
        let h = harness(PaginationConfig::default());
        h.indexer.set_available(false);

        let result = h
            .resolver
            .resolve_page(&QueryDescriptor::new(QueryFilters::default()))
            .await;
        assert!(matches!(result, Err(PaginationError::IndexerRequired(_))));
    }

    #[tokio::test]
    async fn test_recovered_indexer_used_again() {
        setup();
        let h = harness(PaginationConfig::default());
        let descriptor = QueryDescriptor::new(QueryFilters::for_targets(["a", "b"]));

        h.indexer.set_available(false);
        h.resolver.resolve_page(&descriptor).await.unwrap();
        h.indexer.set_available(true);
        let page = h.resolver.resolve_page(&descriptor).await.unwrap();

        assert_eq!(keys(&page), vec!["a", "b"]);
        assert_eq!(h.indexer.detail_calls(), 1);
        assert_eq!(h.ledger.enumerations(), 1);
    }

    // =============================================================================
    // LISTINGS
    // =============================================================================

    #[tokio::test]
    async fn test_resolve_all_visits_each_key_once() {
        setup();
        let h = harness(PaginationConfig::for_testing());
        for i in 0..7u64 {
            h.indexer.insert(transfer(&format!("k{i}"), i, 10 + i));
        }

        let groups = h
            .resolver
            .resolve_all(&QueryFilters::default(), Some(2))
            .await
            .unwrap();

        let listed: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        let distinct: BTreeSet<&str> = listed.iter().copied().collect();
        assert_eq!(listed.len(), 10);
        assert_eq!(distinct.len(), 10);
        assert!(listed.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_resolve_all_through_the_api_trait() {
        setup();
        let h = harness(PaginationConfig::default());
        let api: &dyn PaginationApi<Transfer> = &h.resolver;

        let groups = api
            .resolve_all(&QueryFilters::for_targets(["b", "c"]), Some(1))
            .await
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].items, vec![("c".to_string(), 30)]);
    }

    #[tokio::test]
    async fn test_history_pages_need_the_indexer() {
        setup();
        let h = harness(PaginationConfig::default());
        let descriptor = QueryDescriptor::new(QueryFilters::for_targets(["a"])).with_size(1);

        let page = h.resolver.resolve_history_page(&descriptor).await.unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.next, Some(1));

        h.indexer.set_available(false);
        let result = h.resolver.resolve_history_page(&descriptor).await;
        assert!(matches!(result, Err(PaginationError::IndexerRequired(_))));
    }
}
