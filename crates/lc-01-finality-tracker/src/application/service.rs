//! # Finality Tracker Service
//!
//! Drives one submission from hand-off to a terminal outcome.
//!
//! ## Tracking Modes
//!
//! - **Subscription**: the transport pushes statuses into a callback. The
//!   callback owns the lifecycle state and a one-shot resolver; the first
//!   terminal transition consumes the resolver, so duplicate or late updates
//!   can never resolve twice.
//! - **Polling**: record the finalized height, submit, then walk newly
//!   finalized blocks on every attempt of the retry policy. A located block
//!   goes through the same transition function as a pushed `InBlock` status.

use crate::algorithms::{
    fetch_new_blocks, locate_transaction, next_state, ErrorMetadata, NoErrorMetadata,
};
use crate::config::TrackerConfig;
use crate::domain::{
    hash_hex, validate_payload, Hash, LifecycleState, SignedPayload, StatusUpdate,
    SubmissionError, SubmissionOutcome, TransportCapability, TransportError, TxStatus,
};
use crate::metrics;
use crate::ports::{
    LifecycleObserver, StatusCallback, SubmissionApi, SubscriptionHandle, TransportPort,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Counters across all submissions handled by one tracker.
#[derive(Debug, Default)]
pub struct SubmissionStats {
    /// Payloads handed to the transport
    pub submitted: AtomicU64,
    /// Payloads rejected before submission
    pub validation_failures: AtomicU64,
    /// Finalized successfully
    pub finalized: AtomicU64,
    /// Rejected by dispatch
    pub rejected: AtomicU64,
    /// Failed in the transport
    pub transport_errors: AtomicU64,
    /// Polling budget exhausted
    pub timeouts: AtomicU64,
    /// Status streams closed before resolution
    pub closed: AtomicU64,
    /// Updates received after the submission resolved
    pub late_updates: AtomicU64,
    /// Finalized head checks in polling mode
    pub polling_attempts: AtomicU64,
}

/// Resolution handed from the status callback to the waiting submitter.
struct Settled {
    result: Result<SubmissionOutcome, SubmissionError>,
    unsubscribe: bool,
}

/// State owned by one submission's status callback.
struct TrackerCell {
    state: LifecycleState,
    resolver: Option<oneshot::Sender<Settled>>,
}

/// Transaction finality tracker.
pub struct FinalityTracker<T: TransportPort> {
    transport: Arc<T>,
    config: TrackerConfig,
    metadata: Arc<dyn ErrorMetadata>,
    observer: Option<Arc<dyn LifecycleObserver>>,
    stats: Arc<SubmissionStats>,
}

impl<T: TransportPort + 'static> FinalityTracker<T> {
    /// Create a tracker over `transport`.
    pub fn new(transport: Arc<T>, config: TrackerConfig) -> Self {
        Self {
            transport,
            config,
            metadata: Arc::new(NoErrorMetadata),
            observer: None,
            stats: Arc::new(SubmissionStats::default()),
        }
    }

    /// Enrich module errors from `metadata`.
    pub fn with_error_metadata(mut self, metadata: Arc<dyn ErrorMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Notify `observer` on every state transition.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Tracker configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<SubmissionStats> {
        self.stats.clone()
    }

    /// Mode used for the next submission.
    pub fn mode(&self) -> TransportCapability {
        self.config
            .capability_override
            .unwrap_or_else(|| self.transport.capability())
    }

    /// Submit `payload` and wait for its final outcome.
    pub async fn submit(
        &self,
        payload: SignedPayload,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let tx_hash = payload.tx_hash();

        if let Err(e) = validate_payload(&payload) {
            self.stats
                .validation_failures
                .fetch_add(1, Ordering::Relaxed);
            metrics::record_submission(e.kind());
            warn!(tx_hash = %hash_hex(&tx_hash), error = %e, "[lc-01] Payload rejected before submission");
            return Err(e);
        }

        let mode = self.mode();
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        debug!(
            tx_hash = %hash_hex(&tx_hash),
            signer = payload.signer(),
            mode = ?mode,
            "[lc-01] Submitting transaction"
        );

        let result = match mode {
            TransportCapability::Subscription => self.watch(&payload).await,
            TransportCapability::RequestResponse => self.poll(&payload).await,
        };

        self.record_outcome(&tx_hash, &result);
        result
    }

    async fn watch(
        &self,
        payload: &SignedPayload,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let tx_hash = payload.tx_hash();
        let (resolver, settled) = oneshot::channel();
        let callback = status_callback(
            tx_hash,
            resolver,
            self.metadata.clone(),
            self.observer.clone(),
            self.stats.clone(),
        );

        let handle = self
            .transport
            .submit_and_watch(payload, callback)
            .await
            .map_err(|source| SubmissionError::Transport { tx_hash, source })?;

        debug!(tx_hash = %hash_hex(&tx_hash), subscription = %handle, "[lc-01] Watching transaction");

        match settled.await {
            Ok(Settled {
                result,
                unsubscribe,
            }) => {
                if unsubscribe {
                    self.release(handle).await;
                }
                result
            }
            Err(_) => {
                self.stats.closed.fetch_add(1, Ordering::Relaxed);
                Err(SubmissionError::SubscriptionClosed { tx_hash })
            }
        }
    }

    async fn release(&self, handle: SubscriptionHandle) {
        if self.config.await_unsubscribe {
            unsubscribe_quietly(self.transport.as_ref(), &handle).await;
        } else {
            let transport = self.transport.clone();
            tokio::spawn(async move {
                unsubscribe_quietly(transport.as_ref(), &handle).await;
            });
        }
    }

    async fn poll(&self, payload: &SignedPayload) -> Result<SubmissionOutcome, SubmissionError> {
        let tx_hash = payload.tx_hash();
        let with_context = |source: TransportError| SubmissionError::Transport { tx_hash, source };

        let start = self
            .transport
            .finalized_head()
            .await
            .map_err(with_context)?;
        let reported = self.transport.submit(payload).await.map_err(with_context)?;
        if reported != tx_hash {
            warn!(
                tx_hash = %hash_hex(&tx_hash),
                reported = %hash_hex(&reported),
                "[lc-01] Node reported a different transaction hash"
            );
        }

        let policy = self.config.polling;
        let mut state = LifecycleState::Submitted;
        let mut last_checked = start.number;

        for attempt in 0..policy.max_attempts {
            tokio::time::sleep(policy.delay_for(attempt)).await;
            self.stats.polling_attempts.fetch_add(1, Ordering::Relaxed);
            metrics::record_polling_attempt();

            let head = self
                .transport
                .finalized_head()
                .await
                .map_err(with_context)?;
            if head.number <= last_checked {
                debug!(attempt, height = head.number, "[lc-01] No new finalized blocks");
                continue;
            }

            let blocks = fetch_new_blocks(self.transport.as_ref(), last_checked, &head)
                .await
                .map_err(with_context)?;
            last_checked = head.number;

            let Some((block, tx_index)) = locate_transaction(&blocks, &tx_hash) else {
                debug!(
                    attempt,
                    checked = blocks.len(),
                    height = head.number,
                    "[lc-01] Transaction not in new finalized blocks"
                );
                continue;
            };

            let included = TxStatus::InBlock {
                block_hash: block.hash,
                tx_index,
                events: block.events.clone(),
            };
            if let Some(result) = self.apply(&mut state, tx_hash, &included) {
                return result;
            }

            let finalized = TxStatus::Finalized {
                block_hash: block.hash,
            };
            return match self.apply(&mut state, tx_hash, &finalized) {
                Some(Ok(mut outcome)) => {
                    outcome.block_number = Some(block.number);
                    Ok(outcome)
                }
                Some(Err(e)) => Err(e),
                None => Err(with_context(TransportError::Status(format!(
                    "transaction in finalized block {} did not resolve from state {}",
                    hash_hex(&block.hash),
                    state.name()
                )))),
            };
        }

        Err(SubmissionError::FinalityTimeout {
            tx_hash,
            attempts: policy.max_attempts,
        })
    }

    fn apply(
        &self,
        state: &mut LifecycleState,
        tx_hash: Hash,
        status: &TxStatus,
    ) -> Option<Result<SubmissionOutcome, SubmissionError>> {
        let step = next_state(state, tx_hash, status, self.metadata.as_ref());
        if step.changed(state) {
            notify(self.observer.as_deref(), &tx_hash, state, &step.state);
        }
        *state = step.state;
        step.resolution
    }

    fn record_outcome(&self, tx_hash: &Hash, result: &Result<SubmissionOutcome, SubmissionError>) {
        match result {
            Ok(outcome) => {
                self.stats.finalized.fetch_add(1, Ordering::Relaxed);
                metrics::record_submission("finalized");
                info!(
                    tx_hash = %hash_hex(tx_hash),
                    block_hash = %hash_hex(&outcome.block_hash),
                    tx_index = outcome.tx_index,
                    "[lc-01] Transaction finalized"
                );
            }
            Err(e) => {
                let counter = match e {
                    SubmissionError::RejectedOnChain { .. } => &self.stats.rejected,
                    SubmissionError::FinalityTimeout { .. } => &self.stats.timeouts,
                    SubmissionError::SubscriptionClosed { .. } => {
                        // Counted where the stream closed.
                        metrics::record_submission(e.kind());
                        warn!(tx_hash = %hash_hex(tx_hash), error = %e, "[lc-01] Submission failed");
                        return;
                    }
                    _ => &self.stats.transport_errors,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                metrics::record_submission(e.kind());

                if let SubmissionError::RejectedOnChain { .. } = e {
                    info!(tx_hash = %hash_hex(tx_hash), error = %e, "[lc-01] Transaction rejected on chain");
                } else {
                    warn!(tx_hash = %hash_hex(tx_hash), error = %e, "[lc-01] Submission failed");
                }
            }
        }
    }
}

#[async_trait]
impl<T: TransportPort + 'static> SubmissionApi for FinalityTracker<T> {
    async fn submit(&self, payload: SignedPayload) -> Result<SubmissionOutcome, SubmissionError> {
        FinalityTracker::submit(self, payload).await
    }
}

/// Build the status callback for one submission.
///
/// The callback is the only owner of the resolver: once the transport drops
/// it, the waiting submitter observes a closed channel.
fn status_callback(
    tx_hash: Hash,
    resolver: oneshot::Sender<Settled>,
    metadata: Arc<dyn ErrorMetadata>,
    observer: Option<Arc<dyn LifecycleObserver>>,
    stats: Arc<SubmissionStats>,
) -> StatusCallback {
    let cell = Mutex::new(TrackerCell {
        state: LifecycleState::Submitted,
        resolver: Some(resolver),
    });

    Arc::new(move |update: StatusUpdate| {
        if update.tx_hash != tx_hash {
            return;
        }

        let mut cell = cell.lock();
        if cell.state.is_terminal() {
            stats.late_updates.fetch_add(1, Ordering::Relaxed);
            debug!(
                tx_hash = %hash_hex(&tx_hash),
                status = update.status.name(),
                "[lc-01] Ignoring update for resolved transaction"
            );
            return;
        }

        let step = next_state(&cell.state, tx_hash, &update.status, metadata.as_ref());
        debug!(
            tx_hash = %hash_hex(&tx_hash),
            status = update.status.name(),
            from = cell.state.name(),
            to = step.state.name(),
            "[lc-01] Status update"
        );
        if step.changed(&cell.state) {
            notify(observer.as_deref(), &tx_hash, &cell.state, &step.state);
        }
        cell.state = step.state;

        if let Some(result) = step.resolution {
            if let Some(resolver) = cell.resolver.take() {
                // Receiver gone means the submitter stopped waiting.
                let _ = resolver.send(Settled {
                    result,
                    unsubscribe: step.unsubscribe,
                });
            }
        }
    })
}

fn notify(
    observer: Option<&dyn LifecycleObserver>,
    tx_hash: &Hash,
    from: &LifecycleState,
    to: &LifecycleState,
) {
    if let Some(observer) = observer {
        observer.on_transition(tx_hash, from, to);
    }
}

async fn unsubscribe_quietly<T: TransportPort + ?Sized>(transport: &T, handle: &SubscriptionHandle) {
    if let Err(e) = transport.unsubscribe(handle).await {
        metrics::record_unsubscribe_failure();
        warn!(subscription = %handle, error = %e, "[lc-01] Unsubscribe failed");
    }
}
