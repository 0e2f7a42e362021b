//! Entity identification types for QuiverDB
//!
//! Provides strongly-typed identifiers for nodes and edges, a sequential
//! generator, and the partition key derived from property values.

use crate::property::PropertyValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Internal numeric ID for efficient storage and lookup
pub type InternalId = u64;

/// Identifier for a node in the graph
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(InternalId);

impl NodeId {
    /// Create a new random ID
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_u128() as u64)
    }

    /// Create from internal numeric ID
    pub fn from_internal(id: InternalId) -> Self {
        Self(id)
    }

    /// Get the internal numeric representation
    pub fn as_internal(&self) -> InternalId {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an edge in the graph
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(InternalId);

impl EdgeId {
    /// Create a new random ID
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_u128() as u64)
    }

    /// Create from internal numeric ID
    pub fn from_internal(id: InternalId) -> Self {
        Self(id)
    }

    /// Get the internal numeric representation
    pub fn as_internal(&self) -> InternalId {
        self.0
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({})", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition key derived from one or more property values
///
/// Addresses a node's home partition in partition-aware backends. Computed as
/// the xxh3 hash of the designated property values in key order; falls back to
/// hashing the node id when no partition properties are configured.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey(u64);

impl PartitionKey {
    /// Derive a partition key from property values
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a PropertyValue>,
    {
        let mut buf = Vec::new();
        for value in values {
            // Tag each value with its kind so "1" and 1 hash apart
            buf.push(value.type_name().as_bytes()[0]);
            match value {
                PropertyValue::Null => {}
                PropertyValue::Boolean(b) => buf.push(*b as u8),
                PropertyValue::Integer(i) => buf.extend_from_slice(&i.to_le_bytes()),
                PropertyValue::Float(f) => buf.extend_from_slice(&f.to_le_bytes()),
                PropertyValue::String(s) => buf.extend_from_slice(s.as_bytes()),
            }
            buf.push(0x1f);
        }
        Self(xxhash_rust::xxh3::xxh3_64(&buf))
    }

    /// Derive a partition key from a node id (no partition properties)
    pub fn from_node_id(id: NodeId) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(&id.as_internal().to_le_bytes()))
    }

    /// Get the raw hash value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionKey({:#018x})", self.0)
    }
}

/// Identifier generator for sequential IDs within a store
#[derive(Debug)]
pub struct IdGenerator {
    next_node_id: std::sync::atomic::AtomicU64,
    next_edge_id: std::sync::atomic::AtomicU64,
}

impl IdGenerator {
    /// Create a new ID generator
    pub fn new() -> Self {
        Self {
            next_node_id: std::sync::atomic::AtomicU64::new(1),
            next_edge_id: std::sync::atomic::AtomicU64::new(1),
        }
    }

    /// Create with starting values (for recovery)
    pub fn with_start(node_start: u64, edge_start: u64) -> Self {
        Self {
            next_node_id: std::sync::atomic::AtomicU64::new(node_start),
            next_edge_id: std::sync::atomic::AtomicU64::new(edge_start),
        }
    }

    /// Generate the next node ID
    pub fn next_node_id(&self) -> NodeId {
        let id = self
            .next_node_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        NodeId::from_internal(id)
    }

    /// Generate the next edge ID
    pub fn next_edge_id(&self) -> EdgeId {
        let id = self
            .next_edge_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        EdgeId::from_internal(id)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
