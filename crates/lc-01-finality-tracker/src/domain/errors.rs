//! # Domain Errors
//!
//! Error taxonomy for transaction submission.
//!
//! Classification happens at the source: the failure classifier produces
//! [`DispatchError`], the transport produces [`TransportError`]. The tracker
//! only attaches submission context (transaction hash, block hash).

use super::value_objects::DispatchError;
use thiserror::Error;

/// Hash type alias (32 bytes).
pub type Hash = [u8; 32];

/// Render a hash as a `0x`-prefixed hex string.
pub fn hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Errors reported by a [`TransportPort`](crate::ports::TransportPort).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying connection went away.
    #[error("Connection dropped: {0}")]
    ConnectionDropped(String),

    /// The node answered with an RPC-level error.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node reported a terminal, non-dispatch status (dropped, invalid, usurped...).
    #[error("Transaction status error: {0}")]
    Status(String),

    /// A block referenced by hash could not be fetched.
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// The transport does not implement the requested primitive.
    #[error("Unsupported transport operation: {0}")]
    Unsupported(&'static str),
}

/// Submission error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Malformed input caught before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Included in a block, but the ledger's dispatch logic rejected it.
    #[error(
        "Transaction {} rejected on chain in block {} at index {tx_index}: {error}",
        hash_hex(.tx_hash),
        hash_hex(.block_hash)
    )]
    RejectedOnChain {
        /// Submitted transaction hash
        tx_hash: Hash,
        /// Block that included the transaction
        block_hash: Hash,
        /// Index of the transaction within the block
        tx_index: u32,
        /// Decoded dispatch error
        error: DispatchError,
    },

    /// The transport failed for this submission.
    #[error("Transport error for transaction {}: {source}", hash_hex(.tx_hash))]
    Transport {
        /// Submitted transaction hash
        tx_hash: Hash,
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// Polling budget exhausted without locating the transaction.
    #[error(
        "Transaction {} not found in a finalized block after {attempts} polling attempts",
        hash_hex(.tx_hash)
    )]
    FinalityTimeout {
        /// Submitted transaction hash
        tx_hash: Hash,
        /// Attempts performed
        attempts: u32,
    },

    /// The transport released the status callback before a terminal status.
    #[error("Status subscription closed before transaction {} resolved", hash_hex(.tx_hash))]
    SubscriptionClosed {
        /// Submitted transaction hash
        tx_hash: Hash,
    },
}

impl SubmissionError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RejectedOnChain { .. } => "rejected",
            Self::Transport { .. } => "transport",
            Self::FinalityTimeout { .. } => "timeout",
            Self::SubscriptionClosed { .. } => "closed",
        }
    }
}
