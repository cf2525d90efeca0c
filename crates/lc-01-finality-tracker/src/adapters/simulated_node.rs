//! Simulated Ledger Node Adapter
//!
//! Implements `TransportPort` over an in-process chain. Blocks are produced
//! and finalized on demand, so tests control exactly when a transaction is
//! included, retracted or finalized.

use crate::algorithms::{EXTRINSIC_FAILED, SYSTEM_MODULE};
use crate::domain::{
    hash_hex, Block, ChainHead, EventRecord, Hash, SignedPayload, StatusUpdate,
    TransportCapability, TransportError, TxStatus,
};
use crate::ports::{StatusCallback, SubscriptionHandle, TransportPort};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Event emitted for a successful dispatch.
const EXTRINSIC_SUCCESS: &str = "ExtrinsicSuccess";

struct Watcher {
    tx_hash: Hash,
    callback: StatusCallback,
}

#[derive(Default)]
struct NodeState {
    blocks: HashMap<Hash, Block>,
    /// Canonical chain, indexed by height.
    canonical: Vec<Hash>,
    finalized: u64,
    pool: Vec<Hash>,
    failures: HashMap<Hash, Value>,
    watchers: HashMap<SubscriptionHandle, Watcher>,
}

impl NodeState {
    fn best(&self) -> Option<&Block> {
        self.canonical.last().and_then(|hash| self.blocks.get(hash))
    }

    fn notifications(&self, tx_hash: &Hash, status: &TxStatus) -> Vec<(StatusCallback, StatusUpdate)> {
        self.watchers
            .values()
            .filter(|w| &w.tx_hash == tx_hash)
            .map(|w| (w.callback.clone(), StatusUpdate::new(*tx_hash, status.clone())))
            .collect()
    }
}

/// In-process ledger node.
pub struct SimulatedNode {
    capability: TransportCapability,
    state: RwLock<NodeState>,
}

impl SimulatedNode {
    /// Create a node with a genesis block.
    pub fn new(capability: TransportCapability) -> Self {
        let genesis = Block {
            hash: make_block_hash(0, &[0u8; 32], &[]),
            number: 0,
            parent_hash: [0u8; 32],
            extrinsics: Vec::new(),
            events: Vec::new(),
        };
        let mut state = NodeState::default();
        state.canonical.push(genesis.hash);
        state.blocks.insert(genesis.hash, genesis);

        Self {
            capability,
            state: RwLock::new(state),
        }
    }

    /// Node pushing status updates.
    pub fn subscription() -> Self {
        Self::new(TransportCapability::Subscription)
    }

    /// Node answering requests only.
    pub fn request_response() -> Self {
        Self::new(TransportCapability::RequestResponse)
    }

    /// Make `tx_hash` fail dispatch with `data` as the `ExtrinsicFailed` payload.
    pub fn fail_with(&self, tx_hash: Hash, data: Value) {
        self.state.write().failures.insert(tx_hash, data);
    }

    /// Remove a pending transaction from the pool. Watchers see `Dropped` and
    /// their subscriptions end.
    pub fn drop_transaction(&self, tx_hash: &Hash) -> bool {
        let notifications = {
            let mut state = self.state.write();
            let before = state.pool.len();
            state.pool.retain(|h| h != tx_hash);
            if state.pool.len() == before {
                return false;
            }
            let notifications = state.notifications(tx_hash, &TxStatus::Dropped);
            state.watchers.retain(|_, w| &w.tx_hash != tx_hash);
            notifications
        };
        deliver(notifications);
        true
    }

    /// Seal every pooled transaction into a new best block.
    pub fn produce_block(&self) -> Block {
        let (block, notifications) = {
            let mut state = self.state.write();
            let (parent_hash, number) = match state.best() {
                Some(parent) => (parent.hash, parent.number + 1),
                None => ([0u8; 32], 0),
            };
            let extrinsics = std::mem::take(&mut state.pool);

            let events = extrinsics
                .iter()
                .enumerate()
                .map(|(index, tx_hash)| match state.failures.get(tx_hash) {
                    Some(data) => EventRecord::apply_extrinsic(
                        index as u32,
                        SYSTEM_MODULE,
                        EXTRINSIC_FAILED,
                        data.clone(),
                    ),
                    None => EventRecord::apply_extrinsic(
                        index as u32,
                        SYSTEM_MODULE,
                        EXTRINSIC_SUCCESS,
                        json!([{ "class": "Normal", "paysFee": "Yes" }]),
                    ),
                })
                .collect();

            let block = Block {
                hash: make_block_hash(number, &parent_hash, &extrinsics),
                number,
                parent_hash,
                extrinsics,
                events,
            };

            let mut notifications = Vec::new();
            for (index, tx_hash) in block.extrinsics.iter().enumerate() {
                let status = TxStatus::InBlock {
                    block_hash: block.hash,
                    tx_index: index as u32,
                    events: block.events.clone(),
                };
                notifications.extend(state.notifications(tx_hash, &status));
            }

            state.canonical.push(block.hash);
            state.blocks.insert(block.hash, block.clone());
            (block, notifications)
        };

        debug!(
            number = block.number,
            hash = %hash_hex(&block.hash),
            extrinsics = block.extrinsics.len(),
            "[lc-01] Simulated block produced"
        );
        deliver(notifications);
        block
    }

    /// Drop the best block if it is not final. Its transactions go back to
    /// the pool and their watchers see `Retracted`.
    pub fn retract_best(&self) -> Option<Hash> {
        let (hash, notifications) = {
            let mut state = self.state.write();
            let best_number = state.canonical.len().checked_sub(1)? as u64;
            if best_number <= state.finalized {
                return None;
            }
            let hash = state.canonical.pop()?;
            let block = state.blocks.remove(&hash)?;

            let mut notifications = Vec::new();
            for tx_hash in &block.extrinsics {
                notifications.extend(
                    state.notifications(tx_hash, &TxStatus::Retracted { block_hash: hash }),
                );
            }
            let mut pool = block.extrinsics;
            pool.append(&mut state.pool);
            state.pool = pool;
            (hash, notifications)
        };

        deliver(notifications);
        Some(hash)
    }

    /// Finalize the canonical chain up to `number` (capped at the best block).
    pub fn finalize_up_to(&self, number: u64) -> u64 {
        let (finalized, notifications) = {
            let mut state = self.state.write();
            let best = state.canonical.len().saturating_sub(1) as u64;
            let target = number.min(best);

            let mut notifications = Vec::new();
            for height in (state.finalized + 1)..=target {
                let Some(block) = state
                    .canonical
                    .get(height as usize)
                    .and_then(|hash| state.blocks.get(hash))
                else {
                    continue;
                };
                for tx_hash in &block.extrinsics {
                    notifications.extend(state.notifications(
                        tx_hash,
                        &TxStatus::Finalized {
                            block_hash: block.hash,
                        },
                    ));
                }
            }
            state.finalized = state.finalized.max(target);
            (state.finalized, notifications)
        };

        deliver(notifications);
        finalized
    }

    /// Active status subscriptions.
    pub fn watcher_count(&self) -> usize {
        self.state.read().watchers.len()
    }

    /// Transactions waiting in the pool.
    pub fn pending_count(&self) -> usize {
        self.state.read().pool.len()
    }

    fn accept(&self, payload: &SignedPayload) -> Result<Hash, TransportError> {
        let tx_hash = payload.tx_hash();
        let mut state = self.state.write();
        if state.pool.contains(&tx_hash) {
            return Err(TransportError::Rpc(format!(
                "transaction {} already imported",
                hash_hex(&tx_hash)
            )));
        }
        state.pool.push(tx_hash);
        Ok(tx_hash)
    }
}

/// Invoke callbacks with no node lock held.
fn deliver(notifications: Vec<(StatusCallback, StatusUpdate)>) {
    for (callback, update) in notifications {
        callback(update);
    }
}

/// Deterministic block hash.
fn make_block_hash(number: u64, parent_hash: &Hash, extrinsics: &[Hash]) -> Hash {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(number.to_le_bytes());
    hasher.update(parent_hash);
    for tx_hash in extrinsics {
        hasher.update(tx_hash);
    }

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

#[async_trait]
impl TransportPort for SimulatedNode {
    fn capability(&self) -> TransportCapability {
        self.capability
    }

    async fn submit_and_watch(
        &self,
        payload: &SignedPayload,
        callback: StatusCallback,
    ) -> Result<SubscriptionHandle, TransportError> {
        if self.capability != TransportCapability::Subscription {
            return Err(TransportError::Unsupported("submit_and_watch"));
        }
        let tx_hash = self.accept(payload)?;
        let handle = SubscriptionHandle::generate();

        self.state.write().watchers.insert(
            handle.clone(),
            Watcher {
                tx_hash,
                callback: callback.clone(),
            },
        );
        callback(StatusUpdate::new(tx_hash, TxStatus::Ready));
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), TransportError> {
        self.state.write().watchers.remove(handle);
        Ok(())
    }

    async fn submit(&self, payload: &SignedPayload) -> Result<Hash, TransportError> {
        self.accept(payload)
    }

    async fn finalized_head(&self) -> Result<ChainHead, TransportError> {
        let state = self.state.read();
        let hash = state
            .canonical
            .get(state.finalized as usize)
            .copied()
            .ok_or_else(|| TransportError::Rpc("finalized block missing".to_string()))?;
        Ok(ChainHead {
            number: state.finalized,
            hash,
        })
    }

    async fn block_by_hash(&self, hash: &Hash) -> Result<Option<Block>, TransportError> {
        Ok(self.state.read().blocks.get(hash).cloned())
    }
}
