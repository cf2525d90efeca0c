//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The remote ledger endpoint and the optional lifecycle observer.

use crate::domain::{
    Block, ChainHead, Hash, LifecycleState, SignedPayload, StatusUpdate, TransportCapability,
    TransportError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Callback receiving status updates for a watched submission.
///
/// The connection is shared, so updates for other transactions may arrive on
/// the same callback. A transport drops its clone of the callback once the
/// subscription ends.
pub type StatusCallback = Arc<dyn Fn(StatusUpdate) + Send + Sync>;

/// Identifier of an active status subscription.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub String);

impl SubscriptionHandle {
    /// Random handle.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote ledger endpoint.
///
/// Implementations advertise one [`TransportCapability`]. Subscription
/// transports implement `submit_and_watch` and `unsubscribe`; request/response
/// transports implement `submit`. Both implement the head and block queries.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// How the transport reports statuses.
    fn capability(&self) -> TransportCapability;

    /// Submit and register `callback` for status updates.
    async fn submit_and_watch(
        &self,
        payload: &SignedPayload,
        callback: StatusCallback,
    ) -> Result<SubscriptionHandle, TransportError>;

    /// Release a subscription. Idempotent.
    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), TransportError>;

    /// Submit without watching. Returns the transaction hash reported by the node.
    async fn submit(&self, payload: &SignedPayload) -> Result<Hash, TransportError>;

    /// Current finalized head.
    async fn finalized_head(&self) -> Result<ChainHead, TransportError>;

    /// Fetch a block with its extrinsic hashes and events.
    async fn block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, TransportError>;
}

/// Listener notified on every lifecycle state change.
pub trait LifecycleObserver: Send + Sync {
    /// Called after `tx_hash` moved from `from` to `to`.
    fn on_transition(&self, tx_hash: &Hash, from: &LifecycleState, to: &LifecycleState);
}

/// Observer that records transitions as `(from, to)` state names.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<(&'static str, &'static str)>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded transitions in order.
    pub fn transitions(&self) -> Vec<(&'static str, &'static str)> {
        self.transitions.lock().clone()
    }
}

impl LifecycleObserver for RecordingObserver {
    fn on_transition(&self, _tx_hash: &Hash, from: &LifecycleState, to: &LifecycleState) {
        self.transitions.lock().push((from.name(), to.name()));
    }
}

/// Scripted transport for testing.
///
/// Subscription mode replays a scripted sequence of updates synchronously
/// from inside `submit_and_watch`, then keeps the callback so tests can
/// [`emit`](Self::emit) more updates or [`close`](Self::close) the stream.
/// Polling mode serves finalized heads from a queue (the last one repeats)
/// and blocks from a map.
pub struct ScriptedTransport {
    capability: TransportCapability,
    script: Mutex<Vec<StatusUpdate>>,
    callback: Mutex<Option<StatusCallback>>,
    submit_failure: Mutex<Option<TransportError>>,
    heads: Mutex<VecDeque<ChainHead>>,
    blocks: Mutex<HashMap<Hash, Block>>,
    submissions: AtomicUsize,
    unsubscribes: AtomicUsize,
    head_reads: AtomicUsize,
}

impl ScriptedTransport {
    fn with_capability(capability: TransportCapability) -> Self {
        Self {
            capability,
            script: Mutex::new(Vec::new()),
            callback: Mutex::new(None),
            submit_failure: Mutex::new(None),
            heads: Mutex::new(VecDeque::new()),
            blocks: Mutex::new(HashMap::new()),
            submissions: AtomicUsize::new(0),
            unsubscribes: AtomicUsize::new(0),
            head_reads: AtomicUsize::new(0),
        }
    }

    /// Subscription transport replaying `script` on submission.
    pub fn subscription(script: Vec<StatusUpdate>) -> Self {
        let transport = Self::with_capability(TransportCapability::Subscription);
        *transport.script.lock() = script;
        transport
    }

    /// Request/response transport.
    pub fn polling() -> Self {
        Self::with_capability(TransportCapability::RequestResponse)
    }

    /// Fail every submission with `error`.
    pub fn failing_submit(self, error: TransportError) -> Self {
        *self.submit_failure.lock() = Some(error);
        self
    }

    /// Queue a finalized head.
    pub fn with_head(self, head: ChainHead) -> Self {
        self.heads.lock().push_back(head);
        self
    }

    /// Make a block available by hash.
    pub fn with_block(self, block: Block) -> Self {
        self.blocks.lock().insert(block.hash, block);
        self
    }

    /// Push an update on the live callback. Returns `false` when none is registered.
    pub fn emit(&self, update: StatusUpdate) -> bool {
        let callback = self.callback.lock().clone();
        match callback {
            Some(callback) => {
                callback(update);
                true
            }
            None => false,
        }
    }

    /// Drop the callback as a closing connection would.
    pub fn close(&self) {
        self.callback.lock().take();
    }

    /// Number of submissions received.
    pub fn submit_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Number of unsubscribe calls received.
    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    /// Number of finalized head reads.
    pub fn head_reads(&self) -> usize {
        self.head_reads.load(Ordering::SeqCst)
    }

    fn check_submit(&self) -> Result<(), TransportError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        match self.submit_failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TransportPort for ScriptedTransport {
    fn capability(&self) -> TransportCapability {
        self.capability
    }

    async fn submit_and_watch(
        &self,
        _payload: &SignedPayload,
        callback: StatusCallback,
    ) -> Result<SubscriptionHandle, TransportError> {
        if self.capability != TransportCapability::Subscription {
            return Err(TransportError::Unsupported("submit_and_watch"));
        }
        self.check_submit()?;

        *self.callback.lock() = Some(callback.clone());
        let script = std::mem::take(&mut *self.script.lock());
        for update in script {
            callback(update);
        }
        Ok(SubscriptionHandle::generate())
    }

    async fn unsubscribe(&self, _handle: &SubscriptionHandle) -> Result<(), TransportError> {
        self.unsubscribes.fetch_add(1, Ordering::SeqCst);
        self.callback.lock().take();
        Ok(())
    }

    async fn submit(&self, payload: &SignedPayload) -> Result<Hash, TransportError> {
        self.check_submit()?;
        Ok(payload.tx_hash())
    }

    async fn finalized_head(&self) -> Result<ChainHead, TransportError> {
        self.head_reads.fetch_add(1, Ordering::SeqCst);
        let mut heads = self.heads.lock();
        let head = if heads.len() > 1 {
            heads.pop_front()
        } else {
            heads.front().copied()
        };
        head.ok_or_else(|| TransportError::Rpc("no finalized head".to_string()))
    }

    async fn block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, TransportError> {
        Ok(self.blocks.lock().get(hash).cloned())
    }
}
