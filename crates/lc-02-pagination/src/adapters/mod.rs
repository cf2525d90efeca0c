//! # Adapters
//!
//! - `sources`: indexer and ledger [`PageSource`](crate::ports::PageSource) strategies
//! - `memory`: in-memory indexer and ledger backends

pub mod memory;
pub mod sources;

pub use memory::{InMemoryIndexer, InMemoryLedger};
pub use sources::{IndexerPageSource, KeyFn, LedgerPageSource};
