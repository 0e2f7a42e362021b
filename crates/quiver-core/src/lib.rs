//! QuiverDB Core Library
//!
//! This crate provides the fundamental types and error handling for the
//! QuiverDB graph-query engine.
//!
//! # Modules
//!
//! - `types` - Graph entity types (Node, Edge, Path, Label, Direction)
//! - `error` - Error types and result aliases
//! - `id` - Entity identification, id generation, partition keys
//! - `property` - Typed property values and maps

pub mod error;
pub mod id;
pub mod property;
pub mod types;

pub use error::{Error, Result};
pub use id::{EdgeId, IdGenerator, NodeId, PartitionKey};
pub use property::{PropertyMap, PropertyValue};
pub use types::{Direction, Edge, Label, Node, Path, PathSegment};
