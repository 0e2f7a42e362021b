//! QuiverDB Execution Engine
//!
//! Runs compiled plans against a storage adapter and exposes the two user
//! front ends: the statement session and the fluent traversal builder.
//!
//! # Pipeline
//!
//! plan tree -> `exec` (lazy row streams) -> `result` materialization
//!
//! `session` drives the whole path for query text; `traversal` compiles a
//! builder chain into the same plan operators. Execution is pull-based:
//! nothing reads storage until a row is demanded, and every produced tuple
//! checks the cancellation token.

pub mod cancel;
pub mod eval;
pub mod exec;
pub mod result;
pub mod session;
pub mod traversal;

pub use cancel::CancelToken;
pub use eval::{eval_predicate, Binding, Row};
pub use exec::{execute_plan, ExecContext, RowStream};
pub use result::{path_records, BulkFailure, BulkReport, PathRecord, ResultSet};
pub use session::{Output, Session};
pub use traversal::{CompiledTraversal, EdgeInsert, Traversal, TraversalOutput};
