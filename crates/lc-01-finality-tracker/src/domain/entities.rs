//! # Domain Entities
//!
//! Signed payloads, blocks and the events they carry.

use super::errors::Hash;
use serde::{Deserialize, Serialize};

/// A signed transaction ready for submission.
///
/// Built and signed upstream. The tracker never mutates it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPayload {
    envelope: Vec<u8>,
    method: Vec<u8>,
    signer: String,
    signature: String,
    tx_hash: Hash,
}

impl SignedPayload {
    /// Create a payload from its signed parts.
    pub fn new(
        envelope: Vec<u8>,
        method: Vec<u8>,
        signer: impl Into<String>,
        signature: impl Into<String>,
        tx_hash: Hash,
    ) -> Self {
        Self {
            envelope,
            method,
            signer: signer.into(),
            signature: signature.into(),
            tx_hash,
        }
    }

    /// Full signed envelope, as sent on the wire.
    pub fn envelope(&self) -> &[u8] {
        &self.envelope
    }

    /// Encoded call.
    pub fn method(&self) -> &[u8] {
        &self.method
    }

    /// Signer address.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    /// Hex encoded signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Transaction hash computed at signing time.
    pub fn tx_hash(&self) -> Hash {
        self.tx_hash
    }
}

/// Successful, final result of a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Finalized block containing the transaction
    pub block_hash: Hash,
    /// Block height, when the transport reports it
    pub block_number: Option<u64>,
    /// Submitted transaction hash
    pub tx_hash: Hash,
    /// Position of the transaction inside the block
    pub tx_index: u32,
}

/// When an event was emitted during block execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// While applying the extrinsic at this index.
    ApplyExtrinsic(u32),
    /// During block finalization.
    Finalization,
    /// During block initialization.
    Initialization,
}

/// A decoded block event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Execution phase
    pub phase: Phase,
    /// Emitting module (e.g. `system`)
    pub module: String,
    /// Event name (e.g. `ExtrinsicFailed`)
    pub name: String,
    /// Event payload as decoded JSON
    pub data: serde_json::Value,
}

impl EventRecord {
    /// Create an event emitted while applying the extrinsic at `index`.
    pub fn apply_extrinsic(
        index: u32,
        module: impl Into<String>,
        name: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            phase: Phase::ApplyExtrinsic(index),
            module: module.into(),
            name: name.into(),
            data,
        }
    }

    /// Whether this is `module.name`. Case-insensitive.
    pub fn is(&self, module: &str, name: &str) -> bool {
        self.module.eq_ignore_ascii_case(module) && self.name.eq_ignore_ascii_case(name)
    }

    /// Extrinsic index for apply-extrinsic events.
    pub fn extrinsic_index(&self) -> Option<u32> {
        match self.phase {
            Phase::ApplyExtrinsic(index) => Some(index),
            _ => None,
        }
    }
}

/// A block as returned by the transport.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block hash
    pub hash: Hash,
    /// Block height
    pub number: u64,
    /// Parent block hash
    pub parent_hash: Hash,
    /// Transaction hashes in block order
    pub extrinsics: Vec<Hash>,
    /// Events emitted by the block
    pub events: Vec<EventRecord>,
}

impl Block {
    /// Index of `tx_hash` inside this block.
    pub fn position_of(&self, tx_hash: &Hash) -> Option<u32> {
        self.extrinsics
            .iter()
            .position(|h| h == tx_hash)
            .map(|i| i as u32)
    }
}

/// Finalized chain head.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    /// Height
    pub number: u64,
    /// Hash
    pub hash: Hash,
}
