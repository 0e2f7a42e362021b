//! QuiverDB - graph-query engine
//!
//! One logical-plan backbone behind two front ends: a declarative pattern
//! language (SELECT / INSERT / DELETE with MATCH arrows) and a fluent
//! traversal builder. Plans execute lazily against whatever implements the
//! storage-adapter boundary; the in-memory adapter ships as the reference
//! backend.
//!
//! ```
//! use std::sync::Arc;
//! use quiverdb::{MemoryAdapter, Session};
//!
//! let session = Session::new(Arc::new(MemoryAdapter::new()));
//! session.execute("INSERT INTO App (name) VALUES ('A')").unwrap();
//! let out = session.execute("SELECT a.name FROM App AS a").unwrap();
//! # drop(out);
//! ```

pub use quiver_core as core;
pub use quiver_engine as engine;
pub use quiver_query as query;
pub use quiver_store as store;

// Re-export commonly used types
pub use quiver_core::{
    Direction, Edge, EdgeId, Error, Label, Node, NodeId, Path, PropertyMap, PropertyValue, Result,
};

pub use quiver_engine::{
    BulkReport, CancelToken, Output, PathRecord, ResultSet, Session, Traversal,
};
pub use quiver_query::{parse, parse_statement, PlannerConfig, Repetition};
pub use quiver_store::{MemoryAdapter, StorageAdapter, StoreOptions};
