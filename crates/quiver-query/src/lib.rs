//! QuiverDB Query Frontend
//!
//! Compiles query text into executable plans.
//!
//! # Pipeline
//!
//! query text -> `lexer` -> `parser` (AST) -> `view` resolution
//! -> `pattern` graph -> `planner` -> `plan` operator tree
//!
//! Compile-time failures (syntax, unknown labels, malformed patterns,
//! infeasible join orders) all surface before any storage read happens.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod plan;
pub mod planner;
pub mod view;

pub use ast::{
    BinaryOp, CreateViewStmt, DeleteEdgeStmt, DeleteNodesStmt, Expr, InsertEdgeStmt,
    InsertNodeStmt, Literal, MatchEdge, Projection, Repetition, SelectItem, SelectStmt,
    SourceDecl, Statement, ViewArm,
};
pub use lexer::{tokenize, SpannedToken, Token};
pub use parser::{parse, parse_recovering, parse_statement};
pub use pattern::{PatternEdge, PatternGraph, PatternNode};
pub use plan::{LabelArm, PlanOp};
pub use planner::{Planner, PlannerConfig};
pub use view::{ResolvedMatchEdge, ResolvedSelect, ResolvedSource, ViewCatalog, ViewDefinition};
