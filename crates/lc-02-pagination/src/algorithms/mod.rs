//! # Algorithms

pub mod cursor;

pub use cursor::{group_records, group_rows, next_offset, slice_keys, sort_keys};
