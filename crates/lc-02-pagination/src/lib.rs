//! # lc-02-pagination
//!
//! Resolves paginated historical queries across two backends with one set
//! of page semantics.
//!
//! ## Overview
//!
//! - **Indexer path**: grouping query → sort keys → slice → detail query
//! - **Ledger fallback**: direct enumeration for explicit targets, one page
//! - **Resolver-owned cursor**: offsets index the resolver's sorted key list
//!
//! ## Architecture
//!
//! ```text
//! QueryDescriptor ──→ PaginationResolver ──available?──→ IndexerPageSource ──→ IndexerPort
//!                            │
//!                            └──otherwise──→ LedgerPageSource ──→ LedgerEnumerator
//! ```
//!
//! ## Page Semantics
//!
//! | Field | Indexer path | Ledger fallback |
//! |-------|--------------|-----------------|
//! | `data` | groups for keys `[start, start + size)` | every group |
//! | `next` | `None` iff `start + returned >= count` | `None` |
//! | `count` | distinct keys | groups |
//!
//! ## Example
//!
//! ```rust,ignore
//! use lc_02_pagination::*;
//!
//! let resolver = PaginationResolver::new(
//!     PaginationConfig::default(),
//!     Arc::new(IndexerPageSource::new(indexer)),
//! )
//! .with_fallback(Arc::new(LedgerPageSource::new(ledger, key_fn)));
//!
//! let page = resolver
//!     .resolve_page(&QueryDescriptor::new(QueryFilters::default()).with_size(2))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;

pub use adapters::{IndexerPageSource, InMemoryIndexer, InMemoryLedger, KeyFn, LedgerPageSource};
pub use application::{PaginationResolver, PaginationStats};
pub use config::PaginationConfig;
pub use domain::*;
pub use ports::{IndexerPort, LedgerEnumerator, PageSource, PaginationApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
