//! Driving Ports (API - Inbound)

use crate::domain::{SignedPayload, SubmissionError, SubmissionOutcome};
use async_trait::async_trait;

/// Submission API exposed to callers.
#[async_trait]
pub trait SubmissionApi: Send + Sync {
    /// Submit a signed payload and wait for its final outcome.
    ///
    /// Resolves exactly once: with the finalized block, or with the first
    /// terminal failure observed.
    async fn submit(&self, payload: SignedPayload) -> Result<SubmissionOutcome, SubmissionError>;
}
