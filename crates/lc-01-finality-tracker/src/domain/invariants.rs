//! # Payload Invariants
//!
//! Checks that run before anything reaches the transport.

use super::entities::SignedPayload;
use super::errors::SubmissionError;

/// Signature must be non-empty hex, with or without a `0x` prefix.
pub fn invariant_hex_signature(signature: &str) -> Result<(), SubmissionError> {
    let digits = signature
        .strip_prefix("0x")
        .or_else(|| signature.strip_prefix("0X"))
        .unwrap_or(signature);

    if digits.is_empty() {
        return Err(SubmissionError::Validation(
            "signature is empty".to_string(),
        ));
    }

    hex::decode(digits)
        .map(|_| ())
        .map_err(|e| SubmissionError::Validation(format!("signature is not valid hex: {}", e)))
}

/// Payload must carry an envelope and a signer.
pub fn invariant_payload_complete(payload: &SignedPayload) -> Result<(), SubmissionError> {
    if payload.envelope().is_empty() {
        return Err(SubmissionError::Validation(
            "signed envelope is empty".to_string(),
        ));
    }
    if payload.signer().trim().is_empty() {
        return Err(SubmissionError::Validation("signer is empty".to_string()));
    }
    Ok(())
}

/// Run all pre-submission checks.
pub fn validate_payload(payload: &SignedPayload) -> Result<(), SubmissionError> {
    invariant_payload_complete(payload)?;
    invariant_hex_signature(payload.signature())
}
