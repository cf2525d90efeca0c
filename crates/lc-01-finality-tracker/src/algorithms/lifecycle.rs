//! # Lifecycle Transitions
//!
//! Pure transition function for the submission state machine. Both the
//! subscription path and the polling path feed statuses through
//! [`next_state`], so a located block is classified the same way regardless
//! of how it was found.
//!
//! ```text
//! (Submitted | IncludedInBlock, InBlock)   → classify → RejectedOnChain | IncludedInBlock
//! (IncludedInBlock, Finalized same block)  → Finalized
//! (IncludedInBlock, Finalized other block) → unchanged
//! (IncludedInBlock, Retracted same block)  → Submitted
//! (Submitted, Finalized)                   → TransportError
//! (any, Dropped | Invalid | Usurped | ...) → TransportError
//! (terminal, any)                          → unchanged
//! ```

use super::failure_classifier::{classify_failure_with, ErrorMetadata};
use crate::domain::{
    hash_hex, Hash, LifecycleState, SubmissionError, SubmissionOutcome, TransportError, TxStatus,
};

/// Result of applying one status to the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// State after the transition.
    pub state: LifecycleState,
    /// Set exactly when `state` became terminal on this step.
    pub resolution: Option<Result<SubmissionOutcome, SubmissionError>>,
    /// Whether the tracker should release its status subscription.
    pub unsubscribe: bool,
}

impl Step {
    fn stay(state: &LifecycleState) -> Self {
        Self {
            state: state.clone(),
            resolution: None,
            unsubscribe: false,
        }
    }

    fn to(state: LifecycleState) -> Self {
        Self {
            state,
            resolution: None,
            unsubscribe: false,
        }
    }

    fn resolve(
        state: LifecycleState,
        resolution: Result<SubmissionOutcome, SubmissionError>,
        unsubscribe: bool,
    ) -> Self {
        Self {
            state,
            resolution: Some(resolution),
            unsubscribe,
        }
    }

    /// Whether this step changed the state.
    pub fn changed(&self, from: &LifecycleState) -> bool {
        &self.state != from
    }
}

/// Apply `status` to `current`.
pub fn next_state(
    current: &LifecycleState,
    tx_hash: Hash,
    status: &TxStatus,
    metadata: &dyn ErrorMetadata,
) -> Step {
    if current.is_terminal() {
        return Step::stay(current);
    }

    match (current, status) {
        (
            _,
            TxStatus::InBlock {
                block_hash,
                tx_index,
                events,
            },
        ) => match classify_failure_with(events, *tx_index, metadata) {
            Some(error) => Step::resolve(
                LifecycleState::RejectedOnChain {
                    block_hash: *block_hash,
                    tx_index: *tx_index,
                    error: error.clone(),
                },
                Err(SubmissionError::RejectedOnChain {
                    tx_hash,
                    block_hash: *block_hash,
                    tx_index: *tx_index,
                    error,
                }),
                true,
            ),
            None => Step::to(LifecycleState::IncludedInBlock {
                block_hash: *block_hash,
                tx_index: *tx_index,
            }),
        },

        (
            LifecycleState::IncludedInBlock {
                block_hash: included,
                tx_index,
            },
            TxStatus::Finalized { block_hash },
        ) if included == block_hash => {
            let outcome = SubmissionOutcome {
                block_hash: *block_hash,
                block_number: None,
                tx_hash,
                tx_index: *tx_index,
            };
            Step::resolve(LifecycleState::Finalized(outcome.clone()), Ok(outcome), true)
        }

        (LifecycleState::Submitted, TxStatus::Finalized { block_hash }) => {
            let message = format!(
                "finalized in block {} without a prior inclusion report",
                hash_hex(block_hash)
            );
            transport_failure(tx_hash, TransportError::Status(message), true)
        }

        (
            LifecycleState::IncludedInBlock {
                block_hash: included,
                ..
            },
            TxStatus::Retracted { block_hash },
        ) if included == block_hash => Step::to(LifecycleState::Submitted),

        (_, status) if status.is_transport_failure() => {
            transport_failure(tx_hash, status_error(status), false)
        }

        _ => Step::stay(current),
    }
}

fn transport_failure(tx_hash: Hash, source: TransportError, unsubscribe: bool) -> Step {
    Step::resolve(
        LifecycleState::TransportError(source.to_string()),
        Err(SubmissionError::Transport { tx_hash, source }),
        unsubscribe,
    )
}

fn status_error(status: &TxStatus) -> TransportError {
    match status {
        TxStatus::Error(message) => TransportError::Rpc(message.clone()),
        TxStatus::Dropped => TransportError::Status("dropped from the pool".to_string()),
        TxStatus::Invalid => TransportError::Status("declared invalid by the pool".to_string()),
        TxStatus::Usurped { by } => TransportError::Status(format!("usurped by {}", hash_hex(by))),
        TxStatus::FinalityTimeout { block_hash } => TransportError::Status(format!(
            "finality timeout for block {}",
            hash_hex(block_hash)
        )),
        other => TransportError::Status(other.name().to_string()),
    }
}
