//! # Failure Classifier
//!
//! Distinguishes "included but rejected" from "included and accepted" by
//! scanning a block's events for `system.ExtrinsicFailed` at the index of
//! the submitted transaction.
//!
//! A block can contain failures for other transactions. Only the event whose
//! apply-extrinsic phase matches the target index counts.

use crate::domain::{DispatchError, EventRecord, ModuleErrorDetails};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Module emitting the dispatch outcome events.
pub const SYSTEM_MODULE: &str = "system";

/// Event name for a failed dispatch.
pub const EXTRINSIC_FAILED: &str = "ExtrinsicFailed";

/// Lookup of human readable module errors.
pub trait ErrorMetadata: Send + Sync {
    /// Details for `(pallet_index, error_index)`, if known.
    fn lookup(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails>;
}

/// Metadata source that knows nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoErrorMetadata;

impl ErrorMetadata for NoErrorMetadata {
    fn lookup(&self, _pallet_index: u8, _error_index: u8) -> Option<ModuleErrorDetails> {
        None
    }
}

/// In-memory error table.
#[derive(Clone, Debug, Default)]
pub struct StaticErrorMetadata {
    entries: HashMap<(u8, u8), ModuleErrorDetails>,
}

impl StaticErrorMetadata {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an error. Builder style.
    pub fn with_error(
        mut self,
        pallet_index: u8,
        error_index: u8,
        section: &str,
        name: &str,
        docs: &str,
    ) -> Self {
        self.entries.insert(
            (pallet_index, error_index),
            ModuleErrorDetails {
                section: section.to_string(),
                name: name.to_string(),
                docs: docs.to_string(),
            },
        );
        self
    }

    /// Number of registered errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ErrorMetadata for StaticErrorMetadata {
    fn lookup(&self, pallet_index: u8, error_index: u8) -> Option<ModuleErrorDetails> {
        self.entries.get(&(pallet_index, error_index)).cloned()
    }
}

/// Classify the outcome of the transaction at `target_index`.
///
/// Returns `None` when no `system.ExtrinsicFailed` event is attributed to
/// that index, meaning the transaction is accepted pending finality.
pub fn classify_failure(events: &[EventRecord], target_index: u32) -> Option<DispatchError> {
    classify_failure_with(events, target_index, &NoErrorMetadata)
}

/// [`classify_failure`] with module errors enriched from `metadata`.
pub fn classify_failure_with(
    events: &[EventRecord],
    target_index: u32,
    metadata: &dyn ErrorMetadata,
) -> Option<DispatchError> {
    events
        .iter()
        .filter(|event| event.extrinsic_index() == Some(target_index))
        .find(|event| event.is(SYSTEM_MODULE, EXTRINSIC_FAILED))
        .map(|event| decode_dispatch_error(&event.data, metadata))
}

/// Decode the dispatch error carried by an `ExtrinsicFailed` payload.
///
/// Accepts the positional form (`[dispatchError, info]`), the named form
/// (`{ "dispatchError": ..., "dispatchInfo": ... }`) or a bare error value.
/// Anything unrecognised decodes to [`DispatchError::Unclassified`].
pub fn decode_dispatch_error(data: &Value, metadata: &dyn ErrorMetadata) -> DispatchError {
    let raw = match data {
        Value::Array(items) => match items.first() {
            Some(first) => first,
            None => return DispatchError::Unclassified,
        },
        Value::Object(map) => get_ignore_case(map, "dispatchError")
            .or_else(|| get_ignore_case(map, "dispatch_error"))
            .unwrap_or(data),
        other => other,
    };
    decode_error_value(raw, metadata)
}

fn decode_error_value(raw: &Value, metadata: &dyn ErrorMetadata) -> DispatchError {
    match raw {
        Value::String(name) => named_variant(name, None),
        Value::Object(map) if map.len() == 1 => {
            let Some((key, inner)) = map.iter().next() else {
                return DispatchError::Unclassified;
            };
            if key.eq_ignore_ascii_case("module") {
                decode_module_error(inner, metadata)
            } else {
                named_variant(key, Some(inner))
            }
        }
        Value::Object(map) => match get_ignore_case(map, "module") {
            Some(inner) => decode_module_error(inner, metadata),
            None => DispatchError::Unclassified,
        },
        _ => DispatchError::Unclassified,
    }
}

fn named_variant(name: &str, inner: Option<&Value>) -> DispatchError {
    let detail = || inner.map(variant_name).unwrap_or_default();
    match name.to_ascii_lowercase().as_str() {
        "badorigin" => DispatchError::BadOrigin,
        "cannotlookup" => DispatchError::CannotLookup,
        "consumerremaining" => DispatchError::ConsumerRemaining,
        "noproviders" => DispatchError::NoProviders,
        "toomanyconsumers" => DispatchError::TooManyConsumers,
        "token" => DispatchError::Token(detail()),
        "arithmetic" => DispatchError::Arithmetic(detail()),
        "transactional" => DispatchError::Transactional(detail()),
        "other" => DispatchError::Other(detail()),
        _ => match inner {
            Some(_) => DispatchError::Unclassified,
            None => DispatchError::Other(name.to_string()),
        },
    }
}

/// Name of an enum-like JSON value: `"Overflow"` or `{ "Overflow": null }`.
fn variant_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) if map.len() == 1 => map.keys().next().cloned().unwrap_or_default(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_module_error(inner: &Value, metadata: &dyn ErrorMetadata) -> DispatchError {
    let Value::Object(map) = inner else {
        return DispatchError::Unclassified;
    };

    let pallet_index = get_ignore_case(map, "index").and_then(as_byte);
    let error_index = get_ignore_case(map, "error").and_then(error_byte);

    match (pallet_index, error_index) {
        (Some(pallet_index), Some(error_index)) => DispatchError::Module {
            pallet_index,
            error_index,
            details: metadata.lookup(pallet_index, error_index),
        },
        _ => DispatchError::Unclassified,
    }
}

fn as_byte(value: &Value) -> Option<u8> {
    value.as_u64().and_then(|n| u8::try_from(n).ok())
}

/// Error index: plain number, 4-byte hex string (first byte) or byte array.
fn error_byte(value: &Value) -> Option<u8> {
    match value {
        Value::Number(_) => as_byte(value),
        Value::String(s) => {
            let digits = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(digits).ok()?.first().copied()
        }
        Value::Array(items) => items.first().and_then(as_byte),
        _ => None,
    }
}

fn get_ignore_case<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}
