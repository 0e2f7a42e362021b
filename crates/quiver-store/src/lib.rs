//! QuiverDB Storage Layer
//!
//! Defines the narrow adapter boundary the execution engine reads through,
//! plus the in-memory reference adapter used by tests and embedded callers.
//!
//! # Architecture
//!
//! - `adapter` - the `StorageAdapter` trait: node/edge lifecycle, lazy
//!   label scans, adjacency streams, label statistics
//! - `memory` - reference adapter: per-label node index, adjacency lists with
//!   spill pages, optional reverse-edge mirrors
//! - `stats` - label statistics and the process-wide copy-then-swap cache
//! - `options` - store configuration
//!
//! Backends may perform I/O asynchronously behind the adapter; the engine
//! only assumes the synchronous-or-awaitable contract of the trait.

pub mod adapter;
pub mod memory;
pub mod options;
pub mod stats;

pub use adapter::{AdjacencyEntry, AdjacencyStream, NodeStream, PropertyFilter, StorageAdapter};
pub use memory::MemoryAdapter;
pub use options::StoreOptions;
pub use stats::{LabelStatistics, PropertyHistogram, StatisticsCache, StatsSnapshot};
