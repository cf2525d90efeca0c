//! # Submission Flows
//!
//! End-to-end submissions through `FinalityTracker`:
//!
//! 1. **Subscription**: `SimulatedNode` pushes `InBlock` / `Finalized` / `Dropped`
//! 2. **Polling**: `SimulatedNode` answers head and block queries under paused time
//! 3. **Scripted streams**: exact update sequences, late updates, closed streams

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lc_01_finality_tracker::{
        DispatchError, EventRecord, FinalityTracker, Hash, RecordingObserver, RetryPolicy,
        ScriptedTransport, SignedPayload, SimulatedNode, StaticErrorMetadata, StatusUpdate,
        SubmissionError, TrackerConfig, TransportCapability, TransportError, TransportPort,
        TxStatus,
    };
    use lc_telemetry::{init_logging, TelemetryConfig};
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tokio::task::JoinHandle;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const TX: Hash = [0x11; 32];
    const BLOCK: Hash = [0xAA; 32];

    fn setup() {
        let _ = init_logging(&TelemetryConfig::for_testing());
    }

    fn payload(tx_hash: Hash) -> SignedPayload {
        SignedPayload::new(vec![0x04, 0x01], vec![0x05, 0x00], "5Alice", "0xbeef", tx_hash)
    }

    fn failed_at(index: u32, data: serde_json::Value) -> EventRecord {
        EventRecord::apply_extrinsic(index, "System", "ExtrinsicFailed", data)
    }

    fn succeeded_at(index: u32) -> EventRecord {
        EventRecord::apply_extrinsic(index, "System", "ExtrinsicSuccess", json!([{}]))
    }

    fn polling_config(attempts: u32) -> TrackerConfig {
        TrackerConfig::default().with_polling(RetryPolicy::fixed(attempts, 1000))
    }

    fn spawn_submit<T: TransportPort + 'static>(
        tracker: &Arc<FinalityTracker<T>>,
        tx_hash: Hash,
    ) -> JoinHandle<Result<lc_01_finality_tracker::SubmissionOutcome, SubmissionError>> {
        let tracker = tracker.clone();
        tokio::spawn(async move { tracker.submit(payload(tx_hash)).await })
    }

    /// Yield until `ready` holds; the spawned submitter runs in between.
    async fn wait_until(ready: impl Fn() -> bool) {
        for _ in 0..1_000 {
            if ready() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("condition never became true");
    }

    // =============================================================================
    // SUBSCRIPTION MODE
    // =============================================================================

    #[tokio::test]
    async fn test_subscription_finalizes_through_simulated_node() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let observer = Arc::new(RecordingObserver::new());
        let tracker = Arc::new(
            FinalityTracker::new(node.clone(), TrackerConfig::for_testing())
                .with_observer(observer.clone()),
        );

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;

        let block = node.produce_block();
        assert_eq!(node.finalize_up_to(block.number), 1);

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.block_hash, block.hash);
        assert_eq!(outcome.tx_index, 0);
        assert_eq!(outcome.tx_hash, TX);

        assert_eq!(node.watcher_count(), 0);
        assert_eq!(
            observer.transitions(),
            vec![
                ("submitted", "included_in_block"),
                ("included_in_block", "finalized")
            ]
        );
        assert_eq!(tracker.stats().finalized.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_subscription_rejection_resolves_before_finality() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let metadata = StaticErrorMetadata::new().with_error(
            5,
            2,
            "balances",
            "InsufficientBalance",
            "Balance too low to send value",
        );
        let tracker = Arc::new(
            FinalityTracker::new(node.clone(), TrackerConfig::for_testing())
                .with_error_metadata(Arc::new(metadata)),
        );

        node.fail_with(TX, json!([{ "Module": { "index": 5, "error": 2 } }, {}]));
        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;

        let block = node.produce_block();
        let err = pending.await.unwrap().unwrap_err();

        match &err {
            SubmissionError::RejectedOnChain {
                block_hash,
                tx_index,
                error: DispatchError::Module { details, .. },
                ..
            } => {
                assert_eq!(*block_hash, block.hash);
                assert_eq!(*tx_index, 0);
                assert_eq!(details.as_ref().map(|d| d.name.as_str()), Some("InsufficientBalance"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(err.to_string().contains("balances.InsufficientBalance"));

        // Finality arriving later changes nothing.
        node.finalize_up_to(block.number);
        assert_eq!(node.watcher_count(), 0);
        assert_eq!(tracker.stats().rejected.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.stats().finalized.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_retracted_block_then_reinclusion() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let observer = Arc::new(RecordingObserver::new());
        let tracker = Arc::new(
            FinalityTracker::new(node.clone(), TrackerConfig::for_testing())
                .with_observer(observer.clone()),
        );

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;

        node.produce_block();
        assert!(node.retract_best().is_some());
        assert_eq!(node.pending_count(), 1);

        let block = node.produce_block();
        node.finalize_up_to(block.number);

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.block_hash, block.hash);
        assert_eq!(
            observer.transitions(),
            vec![
                ("submitted", "included_in_block"),
                ("included_in_block", "submitted"),
                ("submitted", "included_in_block"),
                ("included_in_block", "finalized"),
            ]
        );
    }

    #[tokio::test]
    async fn test_detached_unsubscribe_releases_watcher() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let tracker = Arc::new(FinalityTracker::new(
            node.clone(),
            TrackerConfig::for_testing().with_await_unsubscribe(false),
        ));

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;

        let block = node.produce_block();
        node.finalize_up_to(block.number);
        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.block_hash, block.hash);

        wait_until(|| node.watcher_count() == 0).await;
        assert_eq!(tracker.stats().finalized.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.stats().late_updates.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_dropped_transaction_is_transport_error() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let tracker = Arc::new(FinalityTracker::new(
            node.clone(),
            TrackerConfig::for_testing(),
        ));

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;
        assert!(node.drop_transaction(&TX));

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Transport {
                tx_hash: TX,
                source: TransportError::Status(_)
            }
        ));
        assert_eq!(err.kind(), "transport");
        assert_eq!(tracker.stats().transport_errors.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_duplicate_submission_rejected_by_node() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let tracker = Arc::new(FinalityTracker::new(
            node.clone(),
            TrackerConfig::for_testing(),
        ));

        let first = spawn_submit(&tracker, TX);
        wait_until(|| node.watcher_count() == 1).await;

        let second = tracker.submit(payload(TX)).await;
        assert!(matches!(
            second,
            Err(SubmissionError::Transport {
                source: TransportError::Rpc(_),
                ..
            })
        ));

        let block = node.produce_block();
        node.finalize_up_to(block.number);
        assert!(first.await.unwrap().is_ok());
    }

    // =============================================================================
    // SCRIPTED STREAMS
    // =============================================================================

    #[tokio::test]
    async fn test_failure_at_submitted_index_with_late_finality() {
        setup();
        let transport = Arc::new(ScriptedTransport::subscription(vec![
            StatusUpdate::new(
                TX,
                TxStatus::InBlock {
                    block_hash: BLOCK,
                    tx_index: 3,
                    events: vec![
                        failed_at(1, json!(["CannotLookup"])),
                        succeeded_at(2),
                        failed_at(3, json!([{ "BadOrigin": null }, {}])),
                    ],
                },
            ),
            StatusUpdate::new(TX, TxStatus::Finalized { block_hash: BLOCK }),
        ]));
        let tracker = FinalityTracker::new(transport.clone(), TrackerConfig::for_testing());

        let err = tracker.submit(payload(TX)).await.unwrap_err();
        match err {
            SubmissionError::RejectedOnChain {
                tx_hash,
                block_hash,
                tx_index,
                error,
            } => {
                assert_eq!(tx_hash, TX);
                assert_eq!(block_hash, BLOCK);
                assert_eq!(tx_index, 3);
                assert_eq!(error, DispatchError::BadOrigin);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let stats = tracker.stats();
        assert_eq!(stats.late_updates.load(Ordering::Relaxed), 1);
        assert_eq!(stats.finalized.load(Ordering::Relaxed), 0);
        assert_eq!(transport.unsubscribe_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_updates_resolve_once() {
        setup();
        let transport = Arc::new(ScriptedTransport::subscription(vec![
            StatusUpdate::new(TX, TxStatus::Ready),
            StatusUpdate::new(
                TX,
                TxStatus::InBlock {
                    block_hash: BLOCK,
                    tx_index: 0,
                    events: vec![succeeded_at(0)],
                },
            ),
            StatusUpdate::new(TX, TxStatus::Finalized { block_hash: BLOCK }),
            StatusUpdate::new(TX, TxStatus::Finalized { block_hash: BLOCK }),
            StatusUpdate::new(TX, TxStatus::Dropped),
        ]));
        let tracker = FinalityTracker::new(transport.clone(), TrackerConfig::for_testing());

        let outcome = tracker.submit(payload(TX)).await.unwrap();
        assert_eq!(outcome.block_hash, BLOCK);
        assert_eq!(outcome.block_number, None);

        let stats = tracker.stats();
        assert_eq!(stats.finalized.load(Ordering::Relaxed), 1);
        assert_eq!(stats.transport_errors.load(Ordering::Relaxed), 0);
        assert_eq!(stats.late_updates.load(Ordering::Relaxed), 2);

        // Unsubscribed: nothing left to deliver to.
        assert!(!transport.emit(StatusUpdate::new(TX, TxStatus::Invalid)));
    }

    #[tokio::test]
    async fn test_closed_stream_reports_subscription_closed() {
        setup();
        let transport = Arc::new(ScriptedTransport::subscription(vec![StatusUpdate::new(
            TX,
            TxStatus::InBlock {
                block_hash: BLOCK,
                tx_index: 0,
                events: vec![succeeded_at(0)],
            },
        )]));
        let tracker = Arc::new(FinalityTracker::new(
            transport.clone(),
            TrackerConfig::for_testing(),
        ));

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| transport.submit_count() == 1).await;
        transport.close();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, SubmissionError::SubscriptionClosed { tx_hash: TX }));
        assert_eq!(tracker.stats().closed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_transport() {
        setup();
        let transport = Arc::new(ScriptedTransport::subscription(vec![]));
        let tracker = FinalityTracker::new(transport.clone(), TrackerConfig::for_testing());

        let bad = SignedPayload::new(vec![0x04], vec![], "5Alice", "not-hex", TX);
        let err = tracker.submit(bad).await.unwrap_err();

        assert!(matches!(err, SubmissionError::Validation(_)));
        assert_eq!(transport.submit_count(), 0);
    }

    // =============================================================================
    // POLLING MODE
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_polling_walks_every_new_finalized_block() {
        setup();
        let node = Arc::new(SimulatedNode::request_response());
        let tracker = Arc::new(FinalityTracker::new(node.clone(), polling_config(5)));
        assert_eq!(tracker.mode(), TransportCapability::RequestResponse);

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.pending_count() == 1).await;

        let included = node.produce_block();
        node.produce_block();
        assert_eq!(node.finalize_up_to(2), 2);

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.block_hash, included.hash);
        assert_eq!(outcome.block_number, Some(1));
        assert_eq!(outcome.tx_index, 0);
        assert_eq!(tracker.stats().polling_attempts.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_classifies_failures_like_subscription() {
        setup();
        let node = Arc::new(SimulatedNode::request_response());
        let tracker = Arc::new(FinalityTracker::new(node.clone(), polling_config(5)));

        node.fail_with(TX, json!([{ "Arithmetic": "Overflow" }, {}]));
        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.pending_count() == 1).await;

        let block = node.produce_block();
        node.finalize_up_to(block.number);

        match pending.await.unwrap() {
            Err(SubmissionError::RejectedOnChain {
                block_hash, error, ..
            }) => {
                assert_eq!(block_hash, block.hash);
                assert!(matches!(error, DispatchError::Arithmetic(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_gives_up_after_budget() {
        setup();
        let node = Arc::new(SimulatedNode::request_response());
        let tracker = Arc::new(FinalityTracker::new(node.clone(), polling_config(3)));

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.pending_count() == 1).await;

        // Included but never finalized.
        node.produce_block();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::FinalityTimeout {
                tx_hash: TX,
                attempts: 3
            }
        ));
        assert_eq!(tracker.stats().timeouts.load(Ordering::Relaxed), 1);
        assert_eq!(tracker.stats().polling_attempts.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capability_override_forces_polling() {
        setup();
        let node = Arc::new(SimulatedNode::subscription());
        let config = polling_config(5).with_capability(TransportCapability::RequestResponse);
        let tracker = Arc::new(FinalityTracker::new(node.clone(), config));

        let pending = spawn_submit(&tracker, TX);
        wait_until(|| node.pending_count() == 1).await;
        assert_eq!(node.watcher_count(), 0);

        let block = node.produce_block();
        node.finalize_up_to(block.number);

        let outcome = pending.await.unwrap().unwrap();
        assert_eq!(outcome.block_number, Some(block.number));
    }
}
