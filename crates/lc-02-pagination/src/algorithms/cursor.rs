//! # Cursor Arithmetic
//!
//! The cursor is an offset into the resolver's own lexicographically sorted
//! key list. Backends never supply it, so backend key order cannot leak into
//! page boundaries.

use crate::domain::{IndexedRow, KeyGroup};
use std::collections::BTreeMap;

/// Deduplicate and sort keys lexicographically.
pub fn sort_keys(mut keys: Vec<String>) -> Vec<String> {
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Keys in `[start, start + size)`. Empty when `start` is past the end.
pub fn slice_keys(keys: &[String], start: usize, size: usize) -> &[String] {
    if start >= keys.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(keys.len());
    &keys[start..end]
}

/// Offset of the page after `[start, start + size)`.
///
/// `None` once `start + returned` reaches `count`.
pub fn next_offset(start: usize, size: usize, returned: usize, count: usize) -> Option<usize> {
    if start.saturating_add(returned) >= count {
        None
    } else {
        Some(start.saturating_add(size))
    }
}

/// One group per key in `keys`, in that order, holding the matching rows.
///
/// Keys without rows still get an (empty) group; rows outside `keys` are
/// dropped.
pub fn group_rows<T>(keys: &[String], rows: Vec<IndexedRow<T>>) -> Vec<KeyGroup<T>> {
    let mut buckets: BTreeMap<&str, Vec<T>> =
        keys.iter().map(|k| (k.as_str(), Vec::new())).collect();

    for row in rows {
        if let Some(items) = buckets.get_mut(row.key.as_str()) {
            items.push(row.value);
        }
    }

    keys.iter()
        .map(|key| KeyGroup {
            key: key.clone(),
            items: buckets.remove(key.as_str()).unwrap_or_default(),
        })
        .collect()
}

/// Group records by a derived key. Groups come out sorted by key.
pub fn group_records<T, F>(records: Vec<T>, key_fn: F) -> Vec<KeyGroup<T>>
where
    F: Fn(&T) -> String,
{
    let mut buckets: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for record in records {
        buckets.entry(key_fn(&record)).or_default().push(record);
    }
    buckets
        .into_iter()
        .map(|(key, items)| KeyGroup { key, items })
        .collect()
}
