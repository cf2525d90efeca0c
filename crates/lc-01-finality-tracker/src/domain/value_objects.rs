//! # Domain Value Objects
//!
//! Transaction statuses, lifecycle states, dispatch errors and retry policy.

use super::entities::{EventRecord, SubmissionOutcome};
use super::errors::Hash;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// What the transport can do for status tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportCapability {
    /// Push status updates through a subscription callback.
    Subscription,
    /// One-shot requests only; the tracker polls.
    RequestResponse,
}

/// Raw status reported by the transport for one transaction.
///
/// Within one submission the transport reports `InBlock` no later than
/// `Finalized` for the same block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxStatus {
    /// Waiting in the pool on a nonce gap.
    Future,
    /// Valid and waiting in the pool.
    Ready,
    /// Gossiped to peers.
    Broadcast(Vec<String>),
    /// Included in a block. Carries the block's decoded events.
    InBlock {
        /// Including block
        block_hash: Hash,
        /// Position of the transaction inside the block
        tx_index: u32,
        /// Events emitted by the block
        events: Vec<EventRecord>,
    },
    /// The including block was retracted by a re-org.
    Retracted {
        /// Retracted block
        block_hash: Hash,
    },
    /// Finality was not reached within the node's own window.
    FinalityTimeout {
        /// Block that failed to finalize
        block_hash: Hash,
    },
    /// The including block is final.
    Finalized {
        /// Finalized block
        block_hash: Hash,
    },
    /// Replaced by another transaction with the same nonce.
    Usurped {
        /// Hash of the replacing transaction
        by: Hash,
    },
    /// Dropped from the pool.
    Dropped,
    /// Declared invalid by the pool.
    Invalid,
    /// Connection- or consensus-level error.
    Error(String),
}

impl TxStatus {
    /// Status name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Ready => "ready",
            Self::Broadcast(_) => "broadcast",
            Self::InBlock { .. } => "in_block",
            Self::Retracted { .. } => "retracted",
            Self::FinalityTimeout { .. } => "finality_timeout",
            Self::Finalized { .. } => "finalized",
            Self::Usurped { .. } => "usurped",
            Self::Dropped => "dropped",
            Self::Invalid => "invalid",
            Self::Error(_) => "error",
        }
    }

    /// Statuses after which the transport stops reporting on its own.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::FinalityTimeout { .. }
                | Self::Usurped { .. }
                | Self::Dropped
                | Self::Invalid
                | Self::Error(_)
        )
    }
}

/// A status update pushed on a shared connection.
///
/// The connection may carry updates for unrelated submissions, so every
/// update names the transaction it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Transaction the update refers to
    pub tx_hash: Hash,
    /// Reported status
    pub status: TxStatus,
}

impl StatusUpdate {
    /// Create a new update.
    pub fn new(tx_hash: Hash, status: TxStatus) -> Self {
        Self { tx_hash, status }
    }
}

/// Transaction lifecycle state machine.
///
/// ```text
/// [Submitted] ──in block──→ [IncludedInBlock] ──finalized──→ [Finalized]
///      │                          │    ↑
///      │                          │    └── retracted / re-included
///      │                          └──ExtrinsicFailed──→ [RejectedOnChain]
///      └──────────transport failure──────────────────→ [TransportError]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Handed to the transport.
    #[default]
    Submitted,
    /// Included in a block, awaiting finality.
    IncludedInBlock {
        /// Including block
        block_hash: Hash,
        /// Position inside the block
        tx_index: u32,
    },
    /// Final and accepted.
    Finalized(SubmissionOutcome),
    /// Included but rejected by dispatch.
    RejectedOnChain {
        /// Including block
        block_hash: Hash,
        /// Position inside the block
        tx_index: u32,
        /// Decoded dispatch error
        error: DispatchError,
    },
    /// Transport reported an unrecoverable error.
    TransportError(String),
}

impl LifecycleState {
    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finalized(_) | Self::RejectedOnChain { .. } | Self::TransportError(_)
        )
    }

    /// State name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::IncludedInBlock { .. } => "included_in_block",
            Self::Finalized(_) => "finalized",
            Self::RejectedOnChain { .. } => "rejected_on_chain",
            Self::TransportError(_) => "transport_error",
        }
    }
}

/// Human readable details for a module error, taken from chain metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleErrorDetails {
    /// Pallet name (e.g. `balances`)
    pub section: String,
    /// Error variant name (e.g. `InsufficientBalance`)
    pub name: String,
    /// Documentation string
    pub docs: String,
}

/// Dispatch error embedded in an `ExtrinsicFailed` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DispatchError {
    /// Error raised by a specific pallet.
    #[error("{}", describe_module_error(*.pallet_index, *.error_index, .details.as_ref()))]
    Module {
        /// Index of the pallet in the runtime
        pallet_index: u8,
        /// Index of the error within the pallet
        error_index: u8,
        /// Metadata lookup result, when available
        details: Option<ModuleErrorDetails>,
    },
    /// Bad origin.
    #[error("BadOrigin")]
    BadOrigin,
    /// A lookup failed.
    #[error("CannotLookup")]
    CannotLookup,
    /// Account still has consumers.
    #[error("ConsumerRemaining")]
    ConsumerRemaining,
    /// Account has no providers.
    #[error("NoProviders")]
    NoProviders,
    /// Too many consumers.
    #[error("TooManyConsumers")]
    TooManyConsumers,
    /// Token error.
    #[error("Token error: {0}")]
    Token(String),
    /// Arithmetic error.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    /// Transactional layer error.
    #[error("Transactional error: {0}")]
    Transactional(String),
    /// Other, with a message.
    #[error("Other: {0}")]
    Other(String),
    /// Payload could not be decoded; generic on-chain failure.
    #[error("Extrinsic failed on chain")]
    Unclassified,
}

fn describe_module_error(
    pallet_index: u8,
    error_index: u8,
    details: Option<&ModuleErrorDetails>,
) -> String {
    match details {
        Some(d) if d.docs.is_empty() => format!("{}.{}", d.section, d.name),
        Some(d) => format!("{}.{}: {}", d.section, d.name, d.docs),
        None => format!(
            "Module error (pallet index {}, error index {})",
            pallet_index, error_index
        ),
    }
}

/// Interval growth between polling attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Constant interval.
    Fixed,
    /// Interval multiplied by `factor` each attempt, capped at `max_interval_ms`.
    Exponential {
        /// Growth factor
        factor: u32,
        /// Upper bound for a single wait
        max_interval_ms: u64,
    },
}

/// Bounded retry policy for polling mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of head checks before giving up.
    pub max_attempts: u32,
    /// Base wait before each check, in milliseconds.
    pub interval_ms: u64,
    /// Interval growth.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed interval policy.
    pub fn fixed(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval_ms,
            backoff: Backoff::Fixed,
        }
    }

    /// Zero-delay policy.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, 0)
    }

    /// Wait before the given attempt (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis = match self.backoff {
            Backoff::Fixed => self.interval_ms,
            Backoff::Exponential {
                factor,
                max_interval_ms,
            } => {
                let growth = (factor.max(1) as u64).saturating_pow(attempt);
                self.interval_ms.saturating_mul(growth).min(max_interval_ms)
            }
        };
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(30, 2_000)
    }
}
